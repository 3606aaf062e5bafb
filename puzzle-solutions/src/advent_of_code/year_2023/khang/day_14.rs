use chrono::{DateTime, Utc};
use puzzle_solver::{
    AutoRegisterProblemSet, Glyph, ParseError, Part, PartSolver, Problem, ProblemSet,
    PuzzleParser, Reporter, SolveError,
};
use std::collections::HashMap;
use std::sync::Arc;

const SPIN_CYCLES: usize = 1_000_000_000;

#[derive(Default, AutoRegisterProblemSet)]
#[puzzle(tags = ["khang", "grid"])]
pub struct ParabolicReflectorDish;

impl ProblemSet for ParabolicReflectorDish {
    fn name(&self) -> &str {
        "Day 14: Parabolic Reflector Dish"
    }

    fn release_time(&self) -> DateTime<Utc> {
        crate::released(2023, 14)
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        vec![
            Part::<Self, 1>::new()
                .with_description("Load on the north beams after tilting north")
                .shared(),
            Part::<Self, 2>::new()
                .with_description("Load after a billion spin cycles")
                .shared(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Platform {
    fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect()
    }

    fn glyphs(&self) -> Vec<Vec<Glyph>> {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|&cell| match cell {
                        b'O' => Glyph::colored("O", "yellow"),
                        b'#' => Glyph::colored("#", "gray"),
                        _ => Glyph::plain("."),
                    })
                    .collect()
            })
            .collect()
    }

    /// Roll every round rock as far as it goes in direction (dx, dy)
    fn tilt(&mut self, dx: isize, dy: isize) {
        let (w, h) = (self.width as isize, self.height as isize);
        let xs: Vec<isize> = if dx > 0 { (0..w).rev().collect() } else { (0..w).collect() };
        let ys: Vec<isize> = if dy > 0 { (0..h).rev().collect() } else { (0..h).collect() };
        for &y in &ys {
            for &x in &xs {
                if self.cells[(y * w + x) as usize] != b'O' {
                    continue;
                }
                let (mut cx, mut cy) = (x, y);
                while (0..w).contains(&(cx + dx))
                    && (0..h).contains(&(cy + dy))
                    && self.cells[((cy + dy) * w + cx + dx) as usize] == b'.'
                {
                    cx += dx;
                    cy += dy;
                }
                self.cells[(y * w + x) as usize] = b'.';
                self.cells[(cy * w + cx) as usize] = b'O';
            }
        }
    }

    fn spin(&mut self) {
        self.tilt(0, -1);
        self.tilt(-1, 0);
        self.tilt(0, 1);
        self.tilt(1, 0);
    }

    fn north_load(&self) -> usize {
        self.cells
            .chunks(self.width)
            .enumerate()
            .map(|(y, row)| row.iter().filter(|&&c| c == b'O').count() * (self.height - y))
            .sum()
    }
}

impl PuzzleParser for ParabolicReflectorDish {
    type Parsed<'a> = Platform;

    fn parse(input: &str) -> Result<Self::Parsed<'_>, ParseError> {
        let lines: Vec<&str> = input.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let width = lines
            .first()
            .map(|l| l.len())
            .ok_or_else(|| ParseError::MissingData("empty platform".into()))?;
        let mut cells = Vec::with_capacity(width * lines.len());
        for (y, line) in lines.iter().enumerate() {
            if line.len() != width {
                return Err(ParseError::InvalidFormat(format!(
                    "row {} has width {}, expected {width}",
                    y + 1,
                    line.len()
                )));
            }
            if let Some(bad) = line.bytes().find(|b| !matches!(b, b'O' | b'#' | b'.')) {
                return Err(ParseError::InvalidFormat(format!(
                    "unexpected {:?} in row {}",
                    bad as char,
                    y + 1
                )));
            }
            cells.extend_from_slice(line.as_bytes());
        }
        Ok(Platform {
            width,
            height: lines.len(),
            cells,
        })
    }
}

impl PartSolver<1> for ParabolicReflectorDish {
    fn solve(platform: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        reporter.grid(platform.rows());
        platform.tilt(0, -1);
        reporter.glyph_grid(platform.glyphs());
        Ok(platform.north_load().to_string())
    }
}

impl PartSolver<2> for ParabolicReflectorDish {
    fn solve(platform: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut cycle = 0;
        while cycle < SPIN_CYCLES {
            if let Some(first) = seen.insert(platform.cells.clone(), cycle) {
                let period = cycle - first;
                reporter.text(format!("cycle {cycle} repeats cycle {first} (period {period})"));
                let remaining = (SPIN_CYCLES - cycle) % period;
                for _ in 0..remaining {
                    platform.spin();
                }
                break;
            }
            platform.spin();
            cycle += 1;
        }
        reporter.glyph_grid(platform.glyphs());
        Ok(platform.north_load().to_string())
    }
}
