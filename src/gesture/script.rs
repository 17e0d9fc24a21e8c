//! Declarative gesture scripts
//!
//! Stored signs may carry a textual gesture description instead of
//! motion data. The text is only ever *read*: literal command tuples are
//! extracted line by line and nothing in it is evaluated.
//!
//! Accepted command lines:
//! - `["mixamorigLeftArm", "rotation", "x", -Math.PI/6, "-"]` (anywhere on the line)
//! - `mixamorigLeftArm x -0.52 -` or `mixamorigLeftArm rotation x -0.52 -`
//!
//! A line `---`, or one containing `ref.animations.push(animations)`,
//! closes the current group. `#` and `//` start comments. Other lines
//! are ignored.

use std::f32::consts::PI;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{Axis, Command, CommandGroup, Direction, GestureDefinition, GestureError, GestureResult, JointRef, Property};

static TUPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*([^,\]]+?)\s*,\s*"([^"]*)"\s*\]"#,
    )
    .expect("tuple pattern is a valid regex")
});

const GROUP_END: &str = "ref.animations.push(animations)";

/// Parse a numeric target: a float literal or a multiple/fraction of PI
pub fn parse_number(text: &str) -> Option<f32> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };

    let pi_rest = rest
        .strip_prefix("Math.PI")
        .or_else(|| rest.strip_prefix("PI"))
        .or_else(|| rest.strip_prefix("pi"));

    let value = match pi_rest {
        Some(op) => {
            let op = op.trim();
            if op.is_empty() {
                PI
            } else if let Some(divisor) = op.strip_prefix('/') {
                let d: f32 = divisor.trim().parse().ok()?;
                if d == 0.0 {
                    return None;
                }
                PI / d
            } else if let Some(factor) = op.strip_prefix('*') {
                PI * factor.trim().parse::<f32>().ok()?
            } else {
                return None;
            }
        }
        None => rest.parse::<f32>().ok()?,
    };

    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn build_command(
    line_no: usize,
    joint: &str,
    property: &str,
    axis: &str,
    target: &str,
    direction: &str,
) -> GestureResult<Command> {
    let fail = |reason: String| GestureError::Script {
        line: line_no,
        reason,
    };
    if joint.trim().is_empty() {
        return Err(fail("missing joint".into()));
    }
    let property: Property = property.parse().map_err(|e: GestureError| fail(e.to_string()))?;
    let axis: Axis = axis.parse().map_err(|e: GestureError| fail(e.to_string()))?;
    let target = parse_number(target).ok_or_else(|| fail(format!("bad target '{}'", target.trim())))?;
    let direction: Direction = direction
        .parse()
        .map_err(|e: GestureError| fail(e.to_string()))?;

    Ok(Command {
        joint: JointRef::new(joint.trim()),
        property,
        axis,
        target,
        direction,
    })
}

fn parse_plain(line_no: usize, line: &str) -> Option<GestureResult<Command>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (joint, property, rest) = match tokens.as_slice() {
        [joint, axis, target, dir] => (*joint, "rotation", [*axis, *target, *dir]),
        [joint, property, axis, target, dir] => (*joint, *property, [*axis, *target, *dir]),
        _ => return None,
    };
    // Only lines that look like "<identifier> <axis> ..." are commands
    if !joint.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == ':')
        || rest[0].parse::<Axis>().is_err()
    {
        return None;
    }
    Some(build_command(line_no, joint, property, rest[0], rest[1], rest[2]))
}

/// Parse a gesture script into a definition named `name`
pub fn parse(name: &str, text: &str) -> GestureResult<GestureDefinition> {
    let mut groups = Vec::new();
    let mut current = CommandGroup::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let ends_group = line == "---" || line.contains(GROUP_END);
        if let Some(caps) = TUPLE.captures(line) {
            current.push(build_command(
                line_no, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5],
            )?);
        } else if !ends_group {
            match parse_plain(line_no, line) {
                Some(command) => current.push(command?),
                None => log::debug!("Ignoring script line {}: {}", line_no, line),
            }
        }

        if ends_group && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }
    if groups.is_empty() {
        return Err(GestureError::Empty);
    }
    Ok(GestureDefinition::new(name, groups))
}

/// Render a definition as a script that `parse` reads back
pub fn render(gesture: &GestureDefinition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", gesture.name);
    for (i, group) in gesture.groups.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        for cmd in group.iter() {
            let _ = writeln!(
                out,
                "{} {} {} {}",
                cmd.joint, cmd.axis, cmd.target, cmd.direction
            );
        }
    }
    out
}

impl GestureDefinition {
    /// Render this gesture as a declarative script
    pub fn to_script(&self) -> String {
        render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.5", 0.5)]
    #[case("-1.25", -1.25)]
    #[case("Math.PI", PI)]
    #[case("-Math.PI/3", -PI / 3.0)]
    #[case("PI/1.5", PI / 1.5)]
    #[case("- pi * 2", -PI * 2.0)]
    fn test_parse_number(#[case] input: &str, #[case] expected: f32) {
        let value = parse_number(input).unwrap();
        assert!((value - expected).abs() < 1e-6, "{input} -> {value}");
    }

    #[rstest]
    #[case("abc")]
    #[case("Math.PI/0")]
    #[case("PI % 2")]
    #[case("")]
    fn test_parse_number_invalid(#[case] input: &str) {
        assert_eq!(parse_number(input), None);
    }

    #[test]
    fn test_parse_legacy_push_syntax() {
        let text = r#"
export const WAVE = (ref) => {
    ref.characters.push('WAVE');
    let animations = []
    animations.push(["mixamorigRightArm", "rotation", "z", Math.PI/3, "+"]);
    animations.push(["mixamorigRightArm", "rotation", "x", -Math.PI/6, "-"]);
    ref.animations.push(animations);

    animations = []
    animations.push(["mixamorigRightArm", "rotation", "z", 0, "-"]);
    ref.animations.push(animations);
}
"#;
        let def = parse("wave", text).unwrap();
        assert_eq!(def.name, "WAVE");
        assert_eq!(def.group_count(), 2);
        assert_eq!(def.groups[0].len(), 2);
        assert!((def.groups[0].commands[0].target - PI / 3.0).abs() < 1e-6);
        assert_eq!(def.groups[1].commands[0].direction, Direction::Decrease);
    }

    #[test]
    fn test_parse_plain_syntax_with_comments() {
        let text = "# greeting\nmixamorigHead x 0.2 +  // nod\nmixamorigNeck rotation y -0.1 -\n---\nmixamorigHead x 0 -\n";
        let def = parse("nod", text).unwrap();
        assert_eq!(def.group_count(), 2);
        assert_eq!(def.groups[0].len(), 2);
        assert_eq!(def.groups[0].commands[1].axis, Axis::Y);
    }

    #[test]
    fn test_parse_reports_bad_line() {
        let err = parse("bad", "mixamorigHead x nope +").unwrap_err();
        assert!(matches!(err, GestureError::Script { line: 1, .. }));
    }

    #[test]
    fn test_parse_empty_script() {
        assert_eq!(parse("none", "// nothing here\n"), Err(GestureError::Empty));
    }

    #[test]
    fn test_commented_tuples_are_ignored() {
        let text = "// [\"mixamorigHead\",\"rotation\",\"x\",1.0,\"+\"]\n# [\"mixamorigNeck\",\"rotation\",\"y\",0.5,\"+\"]";
        assert_eq!(parse("x", text), Err(GestureError::Empty));
    }

    #[test]
    fn test_trailing_comment_after_tuple() {
        let text = r#"animations.push(["mixamorigHead", "rotation", "x", 0.3, "+"]); // ["mixamorigNeck", "rotation", "y", 1, "+"]"#;
        let def = parse("nod", text).unwrap();
        assert_eq!(def.command_count(), 1);
        assert_eq!(def.groups[0].commands[0].joint.as_str(), "mixamorigHead");
    }

    #[test]
    fn test_tuple_on_group_end_line_is_kept() {
        let text = r#"animations.push(["mixamorigHead", "rotation", "x", 0.3, "+"]); ref.animations.push(animations);
animations.push(["mixamorigHead", "rotation", "x", 0, "-"]);"#;
        let def = parse("nod", text).unwrap();
        assert_eq!(def.group_count(), 2);
        assert_eq!(def.groups[0].len(), 1);
        assert_eq!(def.groups[1].commands[0].direction, Direction::Decrease);
    }

    #[test]
    fn test_render_reads_back() {
        let def = GestureDefinition::new(
            "TEST",
            vec![
                vec![Command::rotate("mixamorigHead", Axis::X, 0.123_456_7, Direction::Increase)]
                    .into_iter()
                    .collect(),
                vec![Command::rotate("mixamorigHead", Axis::X, 0.0, Direction::Decrease)]
                    .into_iter()
                    .collect(),
            ],
        );
        let parsed = parse("TEST", &def.to_script()).unwrap();
        assert_eq!(parsed, def);
    }
}
