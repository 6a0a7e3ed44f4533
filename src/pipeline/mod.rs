pub mod engine; // Review engine transport (Ollama / mock)
pub mod ddi; // Deterministic drug-drug interaction scan
pub mod grounding; // Evidence grounding and repair
pub mod safety; // Calibration, guardrails, gating
pub mod audit; // Audit orchestration
pub mod chat; // Report-grounded chat
