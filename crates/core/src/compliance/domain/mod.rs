pub mod compliance_record;
pub mod compliance_tracker;
pub mod helmet_association;
pub mod notification;
