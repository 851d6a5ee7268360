use std::fmt;

// Nagios range: alert when the value lies outside [start, end], or inside it when inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub start: f64,
    pub end: f64,
    pub inverted: bool,
}

impl Threshold {
    pub const fn at_least(start: f64) -> Self {
        Self {
            start,
            end: f64::INFINITY,
            inverted: false,
        }
    }

    pub const fn inside(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            inverted: true,
        }
    }

    pub fn is_violated_by(&self, value: f64) -> bool {
        let inside = self.start <= value && value <= self.end;
        inside == self.inverted
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("@")?;
        }
        if self.start == 0.0 && !self.inverted && self.end.is_finite() {
            return write!(f, "{}", self.end);
        }
        if self.start == f64::NEG_INFINITY {
            f.write_str("~")?;
        } else {
            write!(f, "{}", self.start)?;
        }
        f.write_str(":")?;
        if self.end.is_finite() {
            write!(f, "{}", self.end)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perfdata {
    pub label: String,
    pub value: f64,
    pub unit: &'static str,
    pub warn: Option<Threshold>,
    pub crit: Option<Threshold>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Perfdata {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            unit: "",
            warn: None,
            crit: None,
            min: None,
            max: None,
        }
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub fn warn(mut self, threshold: Threshold) -> Self {
        self.warn = Some(threshold);
        self
    }

    pub fn crit(mut self, threshold: Threshold) -> Self {
        self.crit = Some(threshold);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }
}

impl fmt::Display for Perfdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.contains([' ', '=', '\'']) {
            write!(f, "'{}'", self.label.replace('\'', "''"))?;
        } else {
            f.write_str(&self.label)?;
        }
        write!(f, "={}{}", self.value, self.unit)?;

        let fields = [
            self.warn.map(|t| t.to_string()),
            self.crit.map(|t| t.to_string()),
            self.min.map(|v| v.to_string()),
            self.max.map(|v| v.to_string()),
        ];
        let used = fields
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);
        for field in &fields[..used] {
            write!(f, ";{}", field.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_open_range_flags_any_non_negative_value() {
        let crit = Threshold::inside(0.0, f64::INFINITY);
        assert_eq!(crit.to_string(), "@0:");
        assert!(crit.is_violated_by(0.0));
        assert!(crit.is_violated_by(50_000_000.0));
        assert!(!crit.is_violated_by(-1.0));
    }

    #[test]
    fn at_least_one_flags_zero() {
        let warn = Threshold::at_least(1.0);
        assert_eq!(warn.to_string(), "1:");
        assert!(warn.is_violated_by(0.0));
        assert!(!warn.is_violated_by(3.0));
    }

    #[test]
    fn plain_upper_bound_renders_short_form() {
        let t = Threshold {
            start: 0.0,
            end: 10.0,
            inverted: false,
        };
        assert_eq!(t.to_string(), "10");
        let t = Threshold {
            start: f64::NEG_INFINITY,
            end: 5.0,
            inverted: false,
        };
        assert_eq!(t.to_string(), "~:5");
    }

    #[test]
    fn renders_fields_and_trims_trailing_empties() {
        let diff = Perfdata::new("mtime_boot_diff", -1500.0)
            .unit("us")
            .crit(Threshold::inside(0.0, f64::INFINITY));
        assert_eq!(diff.to_string(), "mtime_boot_diff=-1500us;;@0:");

        let count = Perfdata::new("kernels", 2.0)
            .warn(Threshold::at_least(1.0))
            .min(0.0);
        assert_eq!(count.to_string(), "kernels=2;1:;;0");

        assert_eq!(Perfdata::new("bare", 1.5).to_string(), "bare=1.5");
    }

    #[test]
    fn quotes_labels_with_special_characters() {
        assert_eq!(Perfdata::new("boot diff", 1.0).to_string(), "'boot diff'=1");
        assert_eq!(Perfdata::new("it's", 1.0).to_string(), "'it''s'=1");
    }
}
