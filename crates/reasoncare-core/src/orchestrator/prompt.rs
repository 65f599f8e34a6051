//! Prompt construction for generative agents.

use serde_json::Value;

use reasoncare_contracts::agent::AgentDescriptor;

/// Build the prompt sent to one generative agent.
///
/// The patient payload is embedded pretty-printed. The closing section asks
/// for an explicit `Diagnosis:` line and a `Confidence:` percentage, which
/// is what the response parser looks for.
pub fn agent_prompt(agent: &AgentDescriptor, patient: &Value) -> String {
    let patient_json = serde_json::to_string_pretty(patient).unwrap_or_else(|_| patient.to_string());

    let mut prompt = format!(
        "You are a specialized medical AI agent focusing on {specialization}.\n\
         Your role: {role}.\n\
         \n\
         Patient Data: {patient_json}\n\
         \n\
         Analyze this case from your specialty perspective and provide:\n\
         1. Your assessment\n\
         2. Confidence level (0-100%)\n\
         3. Key findings\n\
         4. Recommendations specific to your specialty\n\
         5. Any concerns or red flags\n\
         \n\
         Begin your answer with a line `Diagnosis: <most likely diagnosis>` followed by \
         a line `Confidence: <0-100>%`.\n",
        specialization = agent.specialization,
        role = agent.role,
    );

    if let Some(focus) = specialty_focus(&agent.specialization) {
        prompt.push('\n');
        prompt.push_str(focus);
        prompt.push('\n');
    }

    prompt
}

fn specialty_focus(specialization: &str) -> Option<&'static str> {
    match specialization {
        "cardiology" => Some(
            "Focus on cardiovascular assessment, cardiac risk factors and chest pain \
             characteristics, and state whether a cardiac workup is needed.",
        ),
        "electrophysiology" => Some(
            "Focus on rhythm analysis and ECG interpretation, and explain the clinical \
             significance of any rhythm abnormality.",
        ),
        "heart_failure" => Some(
            "Focus on heart failure assessment and fluid status; weigh BNP/NT-proBNP, \
             echocardiographic findings and HF staging.",
        ),
        "interventional_cardiology" => Some(
            "Focus on indications for invasive procedures and coronary angiography, and \
             flag high-risk features that call for urgent intervention.",
        ),
        "clinical_reasoning" => Some(
            "Focus on the differential diagnosis and give an explicit reasoning chain \
             for each conclusion.",
        ),
        "synthesis" => Some(
            "Summarize the case as a single point-of-view assessment suitable for \
             physician review.",
        ),
        _ => None,
    }
}
