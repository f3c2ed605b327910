//! Graph Walker

use tracing::{debug, warn};
use wollok_model::{Environment, NodeId};

use super::classify::{classify, ReferenceContext, ReferenceStrategy};
use super::comments::process_comments;
use super::lines::Lines;
use super::token::Token;

/// Structural tokens for everything under `root`, `root` included.
///
/// Nodes that fail to classify are logged and skipped.
pub fn process_code(
    env: &Environment,
    root: NodeId,
    lines: &Lines<'_>,
    strategy: ReferenceStrategy,
) -> Vec<Token> {
    if env.get(root).is_none() {
        warn!("Highlight root {} is not part of the environment", root);
        return Vec::new();
    }

    let mut context = ReferenceContext::new(strategy);
    let mut tokens = Vec::new();

    for id in env.walk(root) {
        match classify(env, id, lines, &context) {
            Ok(classification) => {
                tokens.extend(classification.tokens);
                context.extend(classification.bindings);
            }
            Err(err) => debug!("Skipping {} node {}: {}", env.kind(id), id, err),
        }
    }

    tokens
}

/// Structural tokens followed by comment tokens.
///
/// Each group is ordered on its own; the result as a whole is not sorted.
pub fn walk(
    env: &Environment,
    root: NodeId,
    lines: &Lines<'_>,
    strategy: ReferenceStrategy,
) -> Vec<Token> {
    let mut tokens = process_code(env, root, lines, strategy);
    tokens.extend(process_comments(lines));
    tokens
}
