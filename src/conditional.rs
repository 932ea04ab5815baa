//! Evaluation of `&&` / `||` chains.
//!
//! Each `&&` group succeeds as soon as one of its `||` alternatives succeeds.
//! A group in which every alternative failed ends the chain, but the failure
//! is only reported when that group is the last one; an earlier failed group
//! stops evaluation with an overall success. So `false && echo A` and
//! `false && echo A || echo B` both succeed without printing anything.

use crate::error::ShellResult;
use crate::parser::{AndGroup, Node};

/// Walk `groups`, running each alternative through `run`.
pub fn evaluate<F>(groups: &[AndGroup], mut run: F) -> ShellResult<()>
where
    F: FnMut(&Node) -> ShellResult<()>,
{
    let last = groups.len().saturating_sub(1);
    for (index, group) in groups.iter().enumerate() {
        let mut last_failure = None;
        let mut succeeded = group.alternatives.is_empty();
        for alternative in &group.alternatives {
            match run(alternative) {
                Ok(()) => {
                    succeeded = true;
                    break;
                }
                Err(err) => last_failure = Some(err),
            }
        }
        if succeeded {
            continue;
        }
        if let Some(err) = last_failure {
            if index == last {
                return Err(err);
            }
            tracing::debug!(group = index, error = %err, "group failed, stopping chain");
            return Ok(());
        }
    }
    Ok(())
}
