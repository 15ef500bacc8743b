//! The four reasoning stages of the talent-search pipeline.
//!
//! Each module binds one stage's name, instruction text, output contract and
//! tools. Instruction texts carry the domain rules the contracts cannot
//! express (keyword conventions, scoring weights, schema knowledge); the
//! hard invariants are enforced again in `contracts` and by the orchestrator.

pub mod fact_finder;
pub mod insight_seeker;
pub mod matchmaker;
pub mod planner;
