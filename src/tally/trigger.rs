// internal modules
use crate::error::{Error, Result};
use crate::utils::*;
use crate::xml::Element;

// external crates
use itertools::Itertools;
use serde::Serialize;

/// Statistic a [Trigger] threshold is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Variance,
    StdDev,
    RelErr,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variance => "variance",
            Self::StdDev => "std_dev",
            Self::RelErr => "rel_err",
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "variance" => Ok(Self::Variance),
            "std_dev" => Ok(Self::StdDev),
            "rel_err" => Ok(Self::RelErr),
            _ => Err(Error::Parse(f!("Unknown trigger type \"{s}\""))),
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convergence criterion attached to a tally
///
/// An empty `scores` list applies the trigger to every score of the owning
/// tally. Otherwise every listed score must also be one of the tally's scores,
/// which is checked by the [Tally](crate::tally::Tally) when the trigger is
/// attached and again before export.
///
/// ```rust
/// # use meshtally::tally::{Trigger, TriggerType};
/// let mut trigger = Trigger::new(TriggerType::RelErr, 0.025).unwrap();
/// trigger.set_scores(vec!["total".into(), "fission".into()]);
///
/// assert!(Trigger::new(TriggerType::StdDev, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    trigger_type: TriggerType,
    threshold: f64,
    scores: Vec<String>,
}

impl Trigger {
    /// Threshold must be a positive finite number
    pub fn new(trigger_type: TriggerType, threshold: f64) -> Result<Self> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::Validation(f!(
                "Trigger threshold must be positive, found {threshold}"
            )));
        }
        Ok(Self {
            trigger_type,
            threshold,
            scores: Vec::new(),
        })
    }

    pub fn trigger_type(&self) -> TriggerType {
        self.trigger_type
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scores(&self) -> &[String] {
        &self.scores
    }

    /// Restrict the trigger to a subset of the tally scores
    pub fn set_scores(&mut self, scores: Vec<String>) {
        self.scores = scores;
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("trigger")
            .with_attribute("type", self.trigger_type)
            .with_attribute("threshold", fmt_float(self.threshold));

        if !self.scores.is_empty() {
            element = element.with_attribute("scores", self.scores.iter().join(" "));
        }
        element
    }

    pub fn from_element(element: &Element) -> Result<Self> {
        let trigger_type: TriggerType = element.required_attribute("type")?.parse()?;
        let threshold: f64 = element.parse_required_attribute("threshold")?;

        let mut trigger = Self::new(trigger_type, threshold)
            .map_err(|e| Error::Parse(f!("Invalid <trigger>: {e}")))?;

        if let Some(scores) = element.attribute("scores") {
            trigger.set_scores(scores.split_whitespace().map(String::from).collect());
        }
        Ok(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_without_scores() {
        let trigger = Trigger::new(TriggerType::Variance, 1e-4).unwrap();
        assert_eq!(
            trigger.to_element().to_xml_string(),
            "<trigger type=\"variance\" threshold=\"0.0001\"/>\n"
        );
    }

    #[test]
    fn element_roundtrip() {
        let mut trigger = Trigger::new(TriggerType::RelErr, 0.025).unwrap();
        trigger.set_scores(vec!["total".into(), "fission".into()]);

        let restored = Trigger::from_element(&trigger.to_element()).unwrap();
        assert_eq!(restored, trigger);
    }

    #[test]
    fn unknown_type_is_parse_error() {
        let element = Element::new("trigger")
            .with_attribute("type", "bogus")
            .with_attribute("threshold", "1");
        let error = Trigger::from_element(&element).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Parse);
    }

    #[test]
    fn negative_threshold_in_document() {
        let element = Element::new("trigger")
            .with_attribute("type", "std_dev")
            .with_attribute("threshold", "-1");
        let error = Trigger::from_element(&element).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Parse);
    }
}
