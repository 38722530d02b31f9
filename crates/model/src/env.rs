/// Environment variable selecting how faults before the report are handled
pub const STATUS_RELAY_FAULT_POLICY: &'static str = "STATUS_RELAY_FAULT_POLICY";
