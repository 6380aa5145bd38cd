use std::fmt::{self, Write as _};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ChartError, ChartResult};

/// One absolute-coordinate path instruction.
///
/// `Line` carries its start point as well as its end point so every drawing
/// command has a fixed-length payload for interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move { x: f64, y: f64 },
    Line { x0: f64, y0: f64, x1: f64, y1: f64 },
    Close,
}

impl PathCommand {
    /// End point of the command, if it has one.
    #[must_use]
    pub fn end_point(self) -> Option<(f64, f64)> {
        match self {
            Self::Move { x, y } => Some((x, y)),
            Self::Line { x1, y1, .. } => Some((x1, y1)),
            Self::Close => None,
        }
    }

    fn payload(self) -> [f64; 4] {
        match self {
            Self::Move { x, y } => [x, y, x, y],
            Self::Line { x0, y0, x1, y1 } => [x0, y0, x1, y1],
            Self::Close => [0.0; 4],
        }
    }

    fn lerp(self, target: Self, t: f64) -> Self {
        if matches!(target, Self::Close) {
            return Self::Close;
        }
        let from = match self {
            // A close has no coordinates of its own; morph from the target.
            Self::Close => target.payload(),
            other => other.payload(),
        };
        let to = target.payload();
        let mix = |i: usize| from[i] + (to[i] - from[i]) * t;
        match target {
            Self::Move { .. } => Self::Move { x: mix(2), y: mix(3) },
            Self::Line { .. } => Self::Line {
                x0: mix(0),
                y0: mix(1),
                x1: mix(2),
                y1: mix(3),
            },
            Self::Close => Self::Close,
        }
    }
}

/// Ordered list of path commands with an SVG-style string form
/// (`M x,y L x,y ... Z`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
    cursor: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        let mut path = Self::new();
        for command in commands {
            path.push(command);
        }
        path
    }

    /// Appends a command as-is and tracks the current point.
    pub fn push(&mut self, command: PathCommand) {
        match command {
            PathCommand::Move { x, y } => {
                self.subpath_start = Some((x, y));
                self.cursor = self.subpath_start;
            }
            PathCommand::Line { x1, y1, .. } => self.cursor = Some((x1, y1)),
            PathCommand::Close => self.cursor = self.subpath_start,
        }
        self.commands.push(command);
    }

    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.push(PathCommand::Move { x, y });
    }

    /// Appends a line from the current point. Without a current point the
    /// line degenerates to a move.
    pub fn line_to(&mut self, x: f64, y: f64) {
        match self.cursor {
            Some((x0, y0)) => self.push(PathCommand::Line { x0, y0, x1: x, y1: y }),
            None => self.move_to(x, y),
        }
    }

    pub fn close(&mut self) {
        self.push(PathCommand::Close);
    }

    /// End point of the last drawing command. After a close this is the
    /// start of the closed subpath.
    #[must_use]
    pub fn current_point(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Parses an SVG-style path string.
    ///
    /// Supports `M`/`L`/`H`/`V`/`Z` and their relative lower-case forms;
    /// relative coordinates are resolved to absolute ones. Implicit repeated
    /// coordinate pairs after `M` are treated as lines.
    pub fn parse(text: &str) -> ChartResult<Self> {
        let mut parser = PathParser::new(text);
        let mut path = Path::new();
        let mut current = (0.0, 0.0);
        let mut subpath_start = (0.0, 0.0);
        let mut command: Option<char> = None;

        loop {
            parser.skip_separators();
            let Some(next) = parser.peek() else {
                break;
            };
            if next.is_ascii_alphabetic() {
                if !matches!(next, 'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'Z' | 'z') {
                    return Err(ChartError::InvalidData(format!(
                        "unsupported path command `{next}` at offset {}",
                        parser.offset()
                    )));
                }
                parser.advance();
                command = Some(next);
                if matches!(next, 'Z' | 'z') {
                    path.close();
                    current = subpath_start;
                    command = None;
                }
                continue;
            }

            let active = command.ok_or_else(|| {
                ChartError::InvalidData(format!(
                    "path coordinate without command at offset {}",
                    parser.offset()
                ))
            })?;
            match active {
                'M' | 'm' => {
                    let (mut x, mut y) = parser.pair()?;
                    if active == 'm' {
                        x += current.0;
                        y += current.1;
                    }
                    path.move_to(x, y);
                    current = (x, y);
                    subpath_start = current;
                    command = Some(if active == 'm' { 'l' } else { 'L' });
                }
                'L' | 'l' => {
                    let (mut x, mut y) = parser.pair()?;
                    if active == 'l' {
                        x += current.0;
                        y += current.1;
                    }
                    path.line_to(x, y);
                    current = (x, y);
                }
                'H' | 'h' => {
                    let mut x = parser.number()?;
                    if active == 'h' {
                        x += current.0;
                    }
                    path.line_to(x, current.1);
                    current.0 = x;
                }
                'V' | 'v' => {
                    let mut y = parser.number()?;
                    if active == 'v' {
                        y += current.1;
                    }
                    path.line_to(current.0, y);
                    current.1 = y;
                }
                other => {
                    return Err(ChartError::InvalidData(format!(
                        "unsupported path command `{other}`"
                    )));
                }
            }
        }

        Ok(path)
    }

    /// Linear morph between two paths, command by command.
    ///
    /// `t <= 0` returns `self` and `t >= 1` returns `target` unchanged. The
    /// shorter list is padded by repeating its final command; commands are
    /// paired by index and the result takes the target's command type. An
    /// empty side is replaced by the other path.
    #[must_use]
    pub fn interpolate(&self, target: &Path, t: f64) -> Path {
        if t.is_nan() || t <= 0.0 {
            return self.clone();
        }
        if t >= 1.0 {
            return target.clone();
        }
        let (Some(last_from), Some(last_to)) = (self.commands.last(), target.commands.last())
        else {
            return if self.is_empty() {
                target.clone()
            } else {
                self.clone()
            };
        };

        let len = self.commands.len().max(target.commands.len());
        let commands = (0..len)
            .map(|i| {
                let from = self.commands.get(i).unwrap_or(last_from);
                let to = target.commands.get(i).unwrap_or(last_to);
                from.lerp(*to, t)
            })
            .collect();
        Path::from_commands(commands)
    }
}

/// String-level morph for collaborators that keep paths serialized.
///
/// The boundary values return the inputs verbatim without parsing them.
pub fn interpolate_path_strings(from: &str, to: &str, t: f64) -> ChartResult<String> {
    if t.is_nan() || t <= 0.0 {
        return Ok(from.to_owned());
    }
    if t >= 1.0 {
        return Ok(to.to_owned());
    }
    let from = Path::parse(from)?;
    let to = Path::parse(to)?;
    Ok(from.interpolate(&to, t).to_string())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            match command {
                PathCommand::Move { x, y } => {
                    write!(f, "M{},{}", format_coord(*x), format_coord(*y))?;
                }
                PathCommand::Line { x1, y1, .. } => {
                    write!(f, "L{},{}", format_coord(*x1), format_coord(*y1))?;
                }
                PathCommand::Close => f.write_char('Z')?,
            }
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Path::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn format_coord(value: f64) -> String {
    let rounded = (value * 1_000.0).round() / 1_000.0;
    if rounded == 0.0 {
        // Avoid printing `-0`.
        return "0".to_owned();
    }
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

struct PathParser<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> PathParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn peek(&self) -> Option<char> {
        self.text[self.offset..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.offset += ch.len_utf8();
        }
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> ChartResult<f64> {
        self.skip_separators();
        let start = self.offset;
        let mut seen_exponent = false;
        while let Some(ch) = self.peek() {
            let at_start = self.offset == start;
            let after_exponent = self.text[..self.offset].ends_with(['e', 'E']);
            let accept = ch.is_ascii_digit()
                || ch == '.'
                || ((ch == '-' || ch == '+') && (at_start || after_exponent))
                || ((ch == 'e' || ch == 'E') && !seen_exponent && !at_start);
            if !accept {
                break;
            }
            if ch == 'e' || ch == 'E' {
                seen_exponent = true;
            }
            self.advance();
        }

        let token = &self.text[start..self.offset];
        token.parse::<f64>().map_err(|_| {
            ChartError::InvalidData(format!("invalid path number `{token}` at offset {start}"))
        })
    }

    fn pair(&mut self) -> ChartResult<(f64, f64)> {
        let x = self.number()?;
        let y = self.number()?;
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_trimmed() {
        assert_eq!(format_coord(12.0), "12");
        assert_eq!(format_coord(1.25), "1.25");
        assert_eq!(format_coord(-0.0001), "0");
        assert_eq!(format_coord(3.14159), "3.142");
    }

    #[test]
    fn relative_commands_resolve_to_absolute() {
        let path = Path::parse("m1,1 l2,0 v3 h-2 z").expect("parse");
        assert_eq!(
            path.commands(),
            &[
                PathCommand::Move { x: 1.0, y: 1.0 },
                PathCommand::Line { x0: 1.0, y0: 1.0, x1: 3.0, y1: 1.0 },
                PathCommand::Line { x0: 3.0, y0: 1.0, x1: 3.0, y1: 4.0 },
                PathCommand::Line { x0: 3.0, y0: 4.0, x1: 1.0, y1: 4.0 },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn exponent_numbers_parse() {
        let path = Path::parse("M1e2,-2.5E-1").expect("parse");
        assert_eq!(path.commands(), &[PathCommand::Move { x: 100.0, y: -0.25 }]);
    }
}
