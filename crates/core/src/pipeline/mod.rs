pub mod monitor_compliance_use_case;
pub mod monitor_logger;
