//! NAPTR records as consumed by the resolver.

use std::fmt;

/// Flag marking a terminal rule whose output is a URI (RFC 2915).
pub const TERMINAL_URI_FLAG: &str = "U";

/// The fields of one NAPTR resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaptrRecord {
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
}

impl NaptrRecord {
    /// Create a record; `replacement` defaults to the root name `.`
    pub fn new(
        order: u16,
        preference: u16,
        flags: impl Into<String>,
        service: impl Into<String>,
        regexp: impl Into<String>,
    ) -> Self {
        Self {
            order,
            preference,
            flags: flags.into(),
            service: service.into(),
            regexp: regexp.into(),
            replacement: String::from("."),
        }
    }

    /// Whether this is a terminal `U` rule for exactly `service`
    #[must_use]
    pub fn is_terminal_for(&self, service: &str) -> bool {
        self.flags.eq_ignore_ascii_case(TERMINAL_URI_FLAG) && self.service == service
    }
}

impl fmt::Display for NaptrRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} \"{}\" \"{}\" \"{}\" {}",
            self.order, self.preference, self.flags, self.service, self.regexp, self.replacement
        )
    }
}

/// Keep the terminal records for `service`, ordered by order then
/// preference. The sort is stable, so ties keep their answer order.
#[must_use]
pub fn select_candidates(records: &[NaptrRecord], service: &str) -> Vec<NaptrRecord> {
    let mut matching: Vec<NaptrRecord> = records
        .iter()
        .filter(|r| r.is_terminal_for(service))
        .cloned()
        .collect();
    matching.sort_by_key(|r| (r.order, r.preference));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "Meta:SMP";

    #[test]
    fn lower_order_first_regardless_of_input_order() {
        let records = vec![
            NaptrRecord::new(100, 10, "U", SERVICE, "!^.*$!http://late.example.org!"),
            NaptrRecord::new(50, 10, "U", SERVICE, "!^.*$!http://early.example.org!"),
        ];
        let selected = select_candidates(&records, SERVICE);
        assert_eq!(selected[0].order, 50);
        assert_eq!(selected[1].order, 100);
    }

    #[test]
    fn preference_breaks_order_ties() {
        let records = vec![
            NaptrRecord::new(10, 20, "U", SERVICE, "!^.*$!http://b!"),
            NaptrRecord::new(10, 5, "U", SERVICE, "!^.*$!http://a!"),
        ];
        let selected = select_candidates(&records, SERVICE);
        assert_eq!(selected[0].preference, 5);
    }

    #[test]
    fn equal_ties_keep_answer_order() {
        let records = vec![
            NaptrRecord::new(10, 10, "U", SERVICE, "!^.*$!http://first!"),
            NaptrRecord::new(10, 10, "U", SERVICE, "!^.*$!http://second!"),
            NaptrRecord::new(10, 10, "U", SERVICE, "!^.*$!http://third!"),
        ];
        let selected = select_candidates(&records, SERVICE);
        let regexps: Vec<_> = selected.iter().map(|r| r.regexp.as_str()).collect();
        assert_eq!(
            regexps,
            ["!^.*$!http://first!", "!^.*$!http://second!", "!^.*$!http://third!"]
        );
    }

    #[test]
    fn non_terminal_and_foreign_service_are_dropped() {
        let records = vec![
            NaptrRecord::new(1, 1, "S", SERVICE, "!^.*$!http://wrong-flag!"),
            NaptrRecord::new(1, 1, "U", "meta:smp", "!^.*$!http://wrong-case-service!"),
            NaptrRecord::new(1, 1, "U", "oasis-bdxr-smp-2", "!^.*$!http://other!"),
            NaptrRecord::new(99, 99, "u", SERVICE, "!^.*$!http://right!"),
        ];
        let selected = select_candidates(&records, SERVICE);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].regexp, "!^.*$!http://right!");
    }

    #[test]
    fn display_is_zone_file_like() {
        let rec = NaptrRecord::new(100, 10, "U", SERVICE, "!^.*$!http://smp!");
        assert_eq!(rec.to_string(), "100 10 \"U\" \"Meta:SMP\" \"!^.*$!http://smp!\" .");
    }
}
