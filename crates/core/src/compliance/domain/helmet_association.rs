use crate::shared::bounding_box::BoundingBox;

/// Whether any helmet center lies strictly within `max_distance` pixels of
/// the person's head point.
///
/// The match is existential: the first qualifying helmet wins and helmets
/// are not reserved, so one helmet may be credited to several persons.
pub fn associate_helmet(person: &BoundingBox, helmets: &[BoundingBox], max_distance: f64) -> bool {
    let (hx, hy) = person.head_point();
    helmets.iter().any(|helmet| {
        let (cx, cy) = helmet.center();
        distance((hx, hy), (cx, cy)) < max_distance
    })
}

fn distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = f64::from(a.0) - f64::from(b.0);
    let dy = f64::from(a.1) - f64::from(b.1);
    dx.hypot(dy)
}
