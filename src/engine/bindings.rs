//! Right-biased binding merge used throughout the translator.
//!
//! `env::merge` (inherited unchanged) is leftmost-wins, which is the
//! opposite of what Node/Section/Workflow jobs need when folding a
//! predecessor's bindings together with its own newly bound names: a later
//! argument must shadow an earlier one of the same name. `combine_bindings`
//! is that merge, ported from `wdltoil.py`'s helper of the same name:
//! environments are sorted ascending by binding count before merging, so the
//! largest environment's bindings win ties over smaller ones, and among
//! equal-size environments the later argument wins.

use crate::env::Bindings;
use crate::value::Value;

/// Merge environments so that later entries (and, after the ascending size
/// sort, larger entries) take precedence over earlier/smaller ones.
pub fn combine_bindings(mut environments: Vec<Bindings<Value>>) -> Bindings<Value> {
    environments.sort_by_key(|env| env.len());

    let mut result = Bindings::new();
    for env in &environments {
        for binding in env.iter() {
            result = result.bind(
                binding.name().to_string(),
                binding.value().clone(),
                binding.info().cloned(),
            );
        }
    }
    result
}
