//! Checklist template catalog
//!
//! Maps an equipment family (package) code to the fixed, ordered list of
//! questions asked when that equipment is inspected. The table is compiled
//! into the binary; adding a family means adding one entry to [`FAMILIES`].

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// An equipment family and its question template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Family {
    pub code: &'static str,
    pub name: &'static str,
    pub questions: &'static [&'static str],
}

impl Family {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// "3100 - Turbine"
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("unknown equipment family '{0}'")]
    #[diagnostic(
        code(ect::catalog::unknown_family),
        help("Known families: 1500 (Big Ball Valves), 3100 (Turbine), 6600 (Transmitters & TW). Run `ect family list`.")
    )]
    UnknownFamily(String),
}

const BIG_BALL_VALVES: &[&str] = &[
    "Check the valve matches the technical specification (material, pressure class, diameter)",
    "Confirm the end connection type (flanged, welded, threaded) is as specified",
    "Check the valve has a hydrostatic test certificate",
    "Confirm the valve body material is as specified (carbon steel, stainless steel, etc.)",
    "Check the ball material is as specified",
    "Confirm the valve seats are suitable for the process fluid",
    "Check the valve has a fire-safe design where applicable",
    "Confirm the actuator (manual or automated) matches the specification",
    "Check drain and vent connections are present where specified",
    "Confirm the valve marking/tag is clear and correct",
    "Check quality and material traceability certificates are available",
    "Confirm the valve has passed dimensional inspection",
    "Check there is no external damage, scratches or corrosion",
    "Confirm all auxiliary connections are properly protected",
];

const TURBINE: &[&str] = &[
    "Check the meter matches the technical specification (diameter, pressure class)",
    "Confirm the connection type is as specified (flanged, threaded)",
    "Check the meter has a valid calibration certificate",
    "Confirm the body material is as specified",
    "Check the rotor and blades are in perfect condition, with no damage or deformation",
    "Confirm the bearings are suitable and lubricated as specified",
    "Check the rotation sensor (pickup) works correctly",
    "Confirm the associated electronics are present and functional",
    "Check flow conditioners are present where specified",
    "Confirm the process connections are clean and unobstructed",
    "Check performance and repeatability test certificates are available",
    "Confirm the measuring range is suitable for the application",
    "Check there is no excessive vibration or abnormal noise",
    "Confirm the installation allows access for maintenance",
    "Check over-speed protection is present where applicable",
];

const TRANSMITTERS: &[&str] = &[
    "Check the transmitter matches the technical specification",
    "Confirm the measuring range is as specified",
    "Check the output signal (4-20mA, HART, Fieldbus) is correct",
    "Confirm the power supply is as specified (24VDC, 110VAC, etc.)",
    "Check there is a valid, traceable calibration certificate",
    "Confirm the hazardous area classification (Ex) suits the installation",
    "Check the body material suits the installation environment",
    "Confirm the process connections are as specified",
    "Check overpressure protection is present where applicable",
    "Confirm the local display works correctly (where applicable)",
    "Check the software configuration is correct",
    "Confirm the IP rating suits the installation environment",
    "Check the electrical connections are properly sealed",
    "Confirm the technical documentation is complete (manual, certificates)",
    "Check there is no external damage to the housing or connections",
    "Confirm accessories (manifold, valves) are present where specified",
];

/// All known families, in code order
pub static FAMILIES: &[Family] = &[
    Family {
        code: "1500",
        name: "Big Ball Valves",
        questions: BIG_BALL_VALVES,
    },
    Family {
        code: "3100",
        name: "Turbine",
        questions: TURBINE,
    },
    Family {
        code: "6600",
        name: "Transmitters & TW",
        questions: TRANSMITTERS,
    },
];

pub fn families() -> &'static [Family] {
    FAMILIES
}

/// Look up a family by code
pub fn family(code: &str) -> Option<&'static Family> {
    let code = code.trim();
    FAMILIES.iter().find(|f| f.code == code)
}

/// Ordered questions for a family; an unknown code yields an empty template
pub fn get_template(code: &str) -> &'static [&'static str] {
    family(code).map(|f| f.questions).unwrap_or(&[])
}

/// Like [`family`], but an unknown code is an error
pub fn require_family(code: &str) -> Result<&'static Family, CatalogError> {
    family(code).ok_or_else(|| CatalogError::UnknownFamily(code.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lengths() {
        assert_eq!(get_template("1500").len(), 14);
        assert_eq!(get_template("3100").len(), 15);
        assert_eq!(get_template("6600").len(), 16);
    }

    #[test]
    fn test_unknown_family_is_empty_template() {
        assert!(get_template("9999").is_empty());
        assert!(family("").is_none());
    }

    #[test]
    fn test_require_family() {
        assert_eq!(require_family(" 3100 ").unwrap().name, "Turbine");
        let err = require_family("42").unwrap_err();
        assert!(err.to_string().contains("'42'"));
    }

    #[test]
    fn test_codes_are_unique_and_sorted() {
        let codes: Vec<_> = families().iter().map(|f| f.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_questions_are_distinct_within_family() {
        for fam in families() {
            let mut qs: Vec<_> = fam.questions.to_vec();
            qs.sort();
            qs.dedup();
            assert_eq!(qs.len(), fam.len(), "duplicate question in {}", fam.code);
        }
    }
}
