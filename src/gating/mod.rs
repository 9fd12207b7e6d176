//! Band classification and eligibility gating.
//!
//! Gates only ever remove tiers from the allowed set:
//! - the cognitive gate removes both memory-care tiers unless a diagnosis is
//!   confirmed and backed by severity or behavioral evidence
//! - the behavior gate (feature-flagged) removes them for moderate cognition
//!   with high support needs when no risky behavior is present

mod bands;
mod gates;

pub use bands::{
    cognition_band, has_risky_behavior, is_high_risk, risky_behavior_count, support_band,
    BandSnapshot, CognitionBand, SupportBand, HIGH_RISK_BEHAVIORS,
};
pub use gates::{
    apply_behavior_gate, cognitive_gate, evaluate_gates, GateConfig, GateOutcome, DX_CONFIRMED,
};
