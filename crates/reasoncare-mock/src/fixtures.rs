//! Canned clinical fixtures served in demo mode.
//!
//! All data in this module is fictional. A fixtures directory may override
//! any of the six fixtures by file name; absent files keep the built-in
//! version.

use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info};

use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};

pub const SYMPTOMS_FILE: &str = "symptoms_input.json";
pub const EHR_FILE: &str = "ehr_data.json";
pub const DIAGNOSIS_V1_FILE: &str = "diagnosis_v1.md";
pub const DIAGNOSIS_V2_FILE: &str = "diagnosis_v2.md";
pub const DOCTOR_FEEDBACK_FILE: &str = "doctor_feedback.md";
pub const UPDATED_GUIDELINES_FILE: &str = "updated_guidelines.md";

const DIAGNOSIS_V1: &str = "\
# Diagnostic Assessment

**Primary Diagnosis:** Unstable Angina Pectoris
**Confidence:** 87%

## Clinical Summary
54-year-old female with hypertension, type 2 diabetes and a family history of
coronary artery disease presenting with three days of intermittent chest pain
radiating to the left arm, with new exertional dyspnea.

## Supporting Findings
- Chest pain at rest lasting 10-15 minutes
- Elevated blood pressure (142/88 mmHg)
- Multiple cardiovascular risk factors

## Differential Diagnosis
1. NSTEMI (pending serial troponins)
2. Stable angina
3. Gastroesophageal reflux disease

## Recommendations
- Serial troponin I at 0, 3 and 6 hours
- 12-lead ECG, repeat with any recurrence of pain
- Aspirin 325 mg loading dose; cardiology consult
";

const DIAGNOSIS_V2: &str = "\
# Diagnostic Assessment (revised)

**Primary Diagnosis:** Unstable Angina Pectoris
**Confidence:** 89%

## Revision Notes
Serial troponins negative at 0 and 3 hours. Dynamic ST depression in V4-V6
during a symptomatic episode supports an ischemic etiology over NSTEMI.

## Updated Plan
- Heparin infusion per ACS protocol
- Early invasive strategy: coronary angiography within 24 hours
- Continue high-intensity statin; hold metformin before contrast
";

const DOCTOR_FEEDBACK: &str = "\
# Attending Review

Assessment agrees with the clinical picture. The reasoning chain is sound and
the differential is appropriately ordered.

- Add a note on holding metformin 48 hours around contrast exposure.
- Document the TIMI risk score explicitly (estimated 4).

Approved for the treatment plan.
";

const UPDATED_GUIDELINES: &str = "\
# Chest Pain Evaluation Guideline v2.1.3

## Changes
- High-sensitivity troponin pathway at 0 and 1 hour replaces the 0/3/6 hour
  protocol where the assay is available.
- Patients with diabetes and a TIMI score of 3 or more are routed to early
  cardiology consult.
- Metformin hold around iodinated contrast is now an explicit checklist item.
";

/// The six demo fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub symptoms: Value,
    pub ehr: Value,
    pub diagnosis_v1: String,
    pub diagnosis_v2: String,
    pub doctor_feedback: String,
    pub updated_guidelines: String,
}

impl Fixtures {
    /// The built-in fixture set.
    pub fn builtin() -> Self {
        Self {
            symptoms: builtin_symptoms(),
            ehr: builtin_ehr(),
            diagnosis_v1: DIAGNOSIS_V1.to_string(),
            diagnosis_v2: DIAGNOSIS_V2.to_string(),
            doctor_feedback: DOCTOR_FEEDBACK.to_string(),
            updated_guidelines: UPDATED_GUIDELINES.to_string(),
        }
    }

    /// Built-in fixtures, with any file present in `dir` taking precedence.
    ///
    /// Returns `ReasonCareError::ConfigError` when the directory is missing
    /// or a present file cannot be read or parsed.
    pub fn load_dir(dir: &Path) -> ReasonCareResult<Self> {
        if !dir.is_dir() {
            return Err(ReasonCareError::ConfigError {
                reason: format!("fixtures directory '{}' does not exist", dir.display()),
            });
        }

        let mut fixtures = Self::builtin();
        if let Some(value) = read_json(dir, SYMPTOMS_FILE)? {
            fixtures.symptoms = value;
        }
        if let Some(value) = read_json(dir, EHR_FILE)? {
            fixtures.ehr = value;
        }
        if let Some(text) = read_text(dir, DIAGNOSIS_V1_FILE)? {
            fixtures.diagnosis_v1 = text;
        }
        if let Some(text) = read_text(dir, DIAGNOSIS_V2_FILE)? {
            fixtures.diagnosis_v2 = text;
        }
        if let Some(text) = read_text(dir, DOCTOR_FEEDBACK_FILE)? {
            fixtures.doctor_feedback = text;
        }
        if let Some(text) = read_text(dir, UPDATED_GUIDELINES_FILE)? {
            fixtures.updated_guidelines = text;
        }

        info!(dir = %dir.display(), "demo fixtures loaded");
        Ok(fixtures)
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_text(dir: &Path, name: &str) -> ReasonCareResult<Option<String>> {
    let path = dir.join(name);
    if !path.exists() {
        debug!(file = name, "fixture not overridden; using built-in");
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| ReasonCareError::ConfigError {
            reason: format!("failed to read fixture '{}': {e}", path.display()),
        })
}

fn read_json(dir: &Path, name: &str) -> ReasonCareResult<Option<Value>> {
    let Some(text) = read_text(dir, name)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ReasonCareError::ConfigError {
            reason: format!("fixture '{name}' is not valid JSON: {e}"),
        })
}

fn builtin_symptoms() -> Value {
    json!({
        "patientId": "P-2024-0847",
        "source": "voice",
        "transcript": "I've had chest pain on and off for three days. It goes into my left arm and since yesterday I get short of breath walking upstairs.",
        "symptoms": [
            { "symptom": "Chest pain", "onset": "3 days ago", "severity": "Moderate" },
            { "symptom": "Left arm discomfort", "onset": "2 days ago", "severity": "Mild" },
            { "symptom": "Shortness of breath", "onset": "1 day ago", "severity": "Mild" }
        ],
        "chiefComplaint": "Intermittent chest pain radiating to the left arm"
    })
}

fn builtin_ehr() -> Value {
    json!({
        "demographics": {
            "name": "Sarah Johnson",
            "dob": "1970-03-15",
            "age": 54,
            "gender": "Female",
            "mrn": "P-2024-0847"
        },
        "vitals": {
            "bp": "142/88 mmHg",
            "hr": "88 bpm",
            "temp": "98.6°F",
            "resp": "16/min",
            "o2sat": "98%"
        },
        "symptoms": [
            { "symptom": "Chest pain", "onset": "3 days ago", "severity": "Moderate" },
            { "symptom": "Left arm discomfort", "onset": "2 days ago", "severity": "Mild" },
            { "symptom": "Shortness of breath", "onset": "1 day ago", "severity": "Mild" }
        ],
        "history": [
            "Hypertension (2018)",
            "Type 2 Diabetes (2020)",
            "Family history of CAD"
        ],
        "medications": [
            "Lisinopril 10mg daily",
            "Metformin 500mg BID",
            "Atorvastatin 20mg daily"
        ]
    })
}
