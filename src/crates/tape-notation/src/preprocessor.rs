//! Textual rewriting that runs before lexing.
//!
//! Two passes, in this order:
//!
//! 1. Function calls. `E(k,n)` / `E(k,n,r)` become Euclidean rhythms, then
//!    `spread(pattern, n)` runs `pattern` through the whole pipeline and
//!    resamples it to `n` steps. Calls are found by scanning, and a call ends at
//!    its balanced closing parenthesis, so `spread(spread(1 2, 4), 2)` works.
//! 2. Variables. `$name = value` assignments (value runs to the next `$`) are
//!    removed and recorded, then every `$name` is replaced by its value.
//!
//! A call whose arguments do not read as integers is left exactly as written.

use crate::context::{is_name_char, PatternContext};
use crate::pipeline::compile;
use std::collections::HashMap;
use tape_core::{euclid_tape, spread, RandomSource, Tape};

/// Run both preprocessing passes over `pattern`
pub fn preprocess<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> String
where
    R: RandomSource + ?Sized,
{
    preprocess_at(pattern, ctx, rng, 0)
}

pub(crate) fn preprocess_at<R>(pattern: &str, ctx: &PatternContext, rng: &mut R, depth: usize) -> String
where
    R: RandomSource + ?Sized,
{
    let expanded = expand_functions_at(pattern, ctx, rng, depth);
    substitute_variables(&expanded, ctx.vars())
}

/// Expand `E(...)` and then `spread(...)` calls
pub fn expand_functions<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> String
where
    R: RandomSource + ?Sized,
{
    expand_functions_at(pattern, ctx, rng, 0)
}

fn expand_functions_at<R>(pattern: &str, ctx: &PatternContext, rng: &mut R, depth: usize) -> String
where
    R: RandomSource + ?Sized,
{
    let max_steps = ctx.limits().max_steps;
    let with_euclid = rewrite_calls(pattern, "E", |args| euclid_call(args, max_steps));

    rewrite_calls(&with_euclid, "spread", |args| {
        let (sub, length) = split_top_level_comma(args)?;
        let target: usize = length.trim().parse().ok()?;

        if target > max_steps {
            tracing::warn!(target, max_steps, "spread target too long, leaving call untouched");
            return None;
        }

        if depth >= ctx.limits().max_depth {
            tracing::warn!(depth, "spread nested too deeply, dropping call");
            return Some(String::new());
        }

        let tape = compile(sub, ctx, rng, depth + 1);
        match spread(&tape.steps, target) {
            Ok(steps) => Some(Tape::new(steps).to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "spread({}, {}) rejected", sub.trim(), target);
                Some(String::new())
            }
        }
    })
}

/// `k,n` or `k,n,rotation`, with at most `max_steps` steps
fn euclid_call(args: &str, max_steps: usize) -> Option<String> {
    let parts: Vec<usize> = args
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;

    let (pulse, step, rotation) = match parts.as_slice() {
        [pulse, step] => (*pulse, *step, 0),
        [pulse, step, rotation] => (*pulse, *step, *rotation),
        _ => return None,
    };

    if step > max_steps {
        tracing::warn!(step, max_steps, "euclidean rhythm too long, leaving call untouched");
        return None;
    }
    Some(euclid_tape(pulse, step, rotation))
}

/// Replace every `name(args)` in `input` for which `rewrite` returns `Some`.
///
/// `name` must start at an identifier boundary. Replacements are separated
/// from neighbouring text by a space so they always lex as whole lexemes.
fn rewrite_calls(input: &str, name: &str, mut rewrite: impl FnMut(&str) -> Option<String>) -> String {
    let open = format!("{}(", name);
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(start) = find_call(input, pos, &open) {
        out.push_str(&input[pos..start]);
        let args_start = start + open.len();

        let replaced = matching_paren(&input[args_start..]).and_then(|close| {
            let args = &input[args_start..args_start + close];
            rewrite(args).map(|replacement| (replacement, args_start + close + 1))
        });

        match replaced {
            Some((replacement, end)) => {
                if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(&replacement);
                if input[end..].starts_with(|c: char| !c.is_whitespace()) {
                    out.push(' ');
                }
                pos = end;
            }
            None => {
                tracing::debug!(call = name, "malformed call left untouched");
                out.push_str(&open);
                pos = args_start;
            }
        }
    }

    out.push_str(&input[pos..]);
    out
}

/// Byte offset of the next `open` at or after `from` that starts an identifier
fn find_call(input: &str, from: usize, open: &str) -> Option<usize> {
    input[from..]
        .match_indices(open)
        .map(|(i, _)| from + i)
        .find(|&i| !input[..i].ends_with(is_name_char))
}

/// Offset of the `)` closing an already-opened parenthesis
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split at the first comma outside nested parentheses
fn split_top_level_comma(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&args[..i], &args[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Strip `$name = value` assignments, then resolve every `$name`.
///
/// `seed` provides values defined outside the pattern; assignments in the
/// pattern override them locally and are never written back.
pub fn substitute_variables(pattern: &str, seed: &HashMap<String, String>) -> String {
    let mut vars = seed.clone();
    let stripped = strip_assignments(pattern, &mut vars);
    resolve_usages(&stripped, &vars)
}

/// Length of the variable name starting at `s`
fn name_len(s: &str) -> usize {
    s.find(|c: char| !is_name_char(c)).unwrap_or(s.len())
}

fn strip_assignments(pattern: &str, vars: &mut HashMap<String, String>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(dollar) = rest.find('$') {
        let after = &rest[dollar + 1..];
        let len = name_len(after);
        let name = &after[..len];
        let tail = after[len..].trim_start();

        match tail.strip_prefix('=') {
            Some(value) if !name.is_empty() => {
                let end = value.find('$').unwrap_or(value.len());
                let value_text = value[..end].trim();
                tracing::debug!(name, value = value_text, "variable assigned");
                vars.insert(name.to_string(), value_text.to_string());
                out.push_str(&rest[..dollar]);
                rest = &value[end..];
            }
            _ => {
                out.push_str(&rest[..dollar + 1 + len]);
                rest = &after[len..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn resolve_usages(text: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let len = name_len(after);

        if len == 0 {
            out.push('$');
        } else {
            let name = &after[..len];
            match vars.get(name) {
                Some(value) => out.push_str(value),
                None => tracing::debug!(name, "undefined variable expands to nothing"),
            }
        }

        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExpandLimits;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(pattern: &str) -> String {
        let mut rng = StdRng::seed_from_u64(0);
        preprocess(pattern, &PatternContext::default(), &mut rng)
    }

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_euclid_call() {
        assert_eq!(run("E(3,8)"), "1 - 1 - 1 - - -");
        assert_eq!(run("E( 0 , 4 )"), "- - - -");
    }

    #[test]
    fn test_euclid_call_with_rotation() {
        assert_eq!(run("E(3,8,1)"), "- 1 - 1 - - - 1");
    }

    #[test]
    fn test_euclid_replacement_is_separated() {
        assert_eq!(words(&run("[E(2,4)]*2")), vec!["[", "1", "-", "1", "-", "]*2"]);
    }

    #[test]
    fn test_malformed_euclid_left_untouched() {
        assert_eq!(run("E(x,8) 1"), "E(x,8) 1");
        assert_eq!(run("E(3) 1"), "E(3) 1");
        assert_eq!(run("E(3,8"), "E(3,8");
    }

    #[test]
    fn test_call_needs_identifier_boundary() {
        assert_eq!(run("XE(3,8)"), "XE(3,8)");
        assert_eq!(run("myspread(1, 2)"), "myspread(1, 2)");
    }

    #[test]
    fn test_spread_call() {
        assert_eq!(run("spread(1 2 3, 6)"), "1 1 2 2 3 3");
        assert_eq!(run("spread(1 2 3 4, 2)"), "1 3");
    }

    #[test]
    fn test_spread_of_group_pattern() {
        assert_eq!(run("spread([ 1 2 ]*2, 2)"), "1 1");
    }

    #[test]
    fn test_nested_spread_uses_balanced_parens() {
        // inner: "1 2" -> 4 steps "1 1 2 2", outer compresses to 2
        assert_eq!(run("spread(spread(1 2, 4), 2)"), "1 2");
    }

    #[test]
    fn test_spread_with_euclid_argument() {
        assert_eq!(run("spread(E(1,2), 4)"), "1 1 - -");
    }

    #[test]
    fn test_spread_zero_length_is_dropped() {
        assert_eq!(words(&run("1 spread(1 2, 0) 2")), vec!["1", "2"]);
    }

    #[test]
    fn test_spread_bad_length_left_untouched() {
        assert_eq!(run("spread(1 2, x)"), "spread(1 2, x)");
        assert_eq!(run("spread(1 2)"), "spread(1 2)");
    }

    #[test]
    fn test_variable_assignment_and_usage() {
        assert_eq!(run("$x = 1 2 3 $x").trim(), "1 2 3");
    }

    #[test]
    fn test_variable_used_before_definition() {
        assert_eq!(words(&run("$a $b $a = 1 $b = 2")), vec!["1", "2"]);
    }

    #[test]
    fn test_variable_reassignment_overwrites() {
        assert_eq!(run("$x = 1 $x = 2 $x").trim(), "2");
    }

    #[test]
    fn test_undefined_variable_is_empty() {
        assert_eq!(words(&run("1 $nope 2")), vec!["1", "2"]);
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(run("1 $ 2"), "1 $ 2");
    }

    #[test]
    fn test_seeded_variables() {
        let seed = HashMap::from([("root".to_string(), "60".to_string())]);
        assert_eq!(substitute_variables("$root - $root", &seed), "60 - 60");
        assert_eq!(substitute_variables("$root = 48 $root", &seed), "48");
        // seed map untouched
        assert_eq!(seed["root"], "60");
    }

    fn run_limited(pattern: &str, limits: ExpandLimits) -> String {
        let ctx = PatternContext::default().with_limits(limits);
        preprocess(pattern, &ctx, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_oversized_calls_left_untouched() {
        assert_eq!(run("E(1,4000000000)"), "E(1,4000000000)");
        assert_eq!(run("spread(1, 4000000000)"), "spread(1, 4000000000)");
    }

    #[test]
    fn test_call_size_follows_step_limit() {
        let limits = ExpandLimits { max_depth: 8, max_steps: 8 };
        assert_eq!(run_limited("E(3,8)", limits), "1 - 1 - 1 - - -");
        assert_eq!(run_limited("E(3,9)", limits), "E(3,9)");
        assert_eq!(run_limited("spread(1 2, 8)", limits), "1 1 1 1 2 2 2 2");
        assert_eq!(run_limited("spread(1 2, 9)", limits), "spread(1 2, 9)");
    }

    #[test]
    fn test_spread_nesting_limit() {
        let pattern = "spread(spread(spread(1, 2), 2), 2)";
        let shallow = ExpandLimits { max_depth: 2, max_steps: 64 };
        assert_eq!(run_limited(pattern, shallow), "");

        let deep_enough = ExpandLimits { max_depth: 3, max_steps: 64 };
        assert_eq!(run_limited(pattern, deep_enough), "1 1");
    }

    #[test]
    fn test_functions_run_before_variables() {
        assert_eq!(
            words(&run("$beat = E(3,8) $beat")),
            vec!["1", "-", "1", "-", "1", "-", "-", "-"]
        );
    }
}
