//! Stock output sinks and the gnuplot animation script.
//!
//! - [`MemorySink`]: keeps every frame.
//! - [`LastFrameSink`]: keeps only the most recent frame.
//! - [`NullSink`]: counts frames and discards them.
//! - [`GnuplotTextSink`]: writes the gnuplot-indexable text format.
//!
//! [`GnuplotScript`] renders the script that turns a
//! [`GnuplotTextSink`] file into an animated GIF. The engine never runs
//! gnuplot itself.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rcgrid_core::{GridRead, OutputSink, SinkError, StepId};
use rcgrid_mesh::Grid;

fn out_of_order(step: StepId, last: StepId) -> SinkError {
    SinkError::Rejected {
        step,
        reason: format!("out of order after step {last}"),
    }
}

// ── MemorySink ─────────────────────────────────────────────────────

/// Keeps a copy of every frame in step order.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    frames: Vec<(StepId, Grid)>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames received so far.
    pub fn frames(&self) -> &[(StepId, Grid)] {
        &self.frames
    }

    /// Number of frames received.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame has been received.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame for `step`, if received.
    pub fn frame(&self, step: StepId) -> Option<&Grid> {
        self.frames
            .binary_search_by_key(&step, |(s, _)| *s)
            .ok()
            .map(|i| &self.frames[i].1)
    }

    /// Take ownership of the frames.
    pub fn into_frames(self) -> Vec<(StepId, Grid)> {
        self.frames
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        if let Some((last, _)) = self.frames.last() {
            if step <= *last {
                return Err(out_of_order(step, *last));
            }
        }
        self.frames.push((step, Grid::capture(snapshot)));
        Ok(())
    }
}

// ── LastFrameSink ──────────────────────────────────────────────────

/// Keeps only the latest frame. Cheap for long runs.
#[derive(Clone, Debug, Default)]
pub struct LastFrameSink {
    last: Option<(StepId, Grid)>,
    frames: u64,
}

impl LastFrameSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest frame and its step.
    pub fn last(&self) -> Option<(StepId, &Grid)> {
        self.last.as_ref().map(|(s, g)| (*s, g))
    }

    /// Frames received.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Take the latest frame.
    pub fn into_last(self) -> Option<(StepId, Grid)> {
        self.last
    }
}

impl OutputSink for LastFrameSink {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        if let Some((last, _)) = &self.last {
            if step <= *last {
                return Err(out_of_order(step, *last));
            }
        }
        self.last = Some((step, Grid::capture(snapshot)));
        self.frames += 1;
        Ok(())
    }
}

// ── NullSink ───────────────────────────────────────────────────────

/// Discards frames, counting them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames received.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl OutputSink for NullSink {
    fn append(&mut self, _step: StepId, _snapshot: &dyn GridRead) -> Result<(), SinkError> {
        self.frames += 1;
        Ok(())
    }
}

// ── GnuplotTextSink ────────────────────────────────────────────────

/// Writes frames as gnuplot data blocks.
///
/// Each node is one line `"<row> <col> <voltage>"` with the voltage to
/// six decimals; each frame is followed by two blank lines so gnuplot's
/// `index k` selects frame `k`.
#[derive(Debug)]
pub struct GnuplotTextSink<W: Write> {
    writer: W,
    frames: u64,
}

impl GnuplotTextSink<BufWriter<File>> {
    /// Create (or truncate) `path` and write frames to it.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> GnuplotTextSink<W> {
    /// Write frames to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Frames written.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, snapshot: &dyn GridRead) -> io::Result<()> {
        let (rows, cols) = snapshot.shape();
        for i in 0..rows {
            for j in 0..cols {
                let v = snapshot.get(i, j).unwrap_or(0.0);
                writeln!(self.writer, "{i} {j} {v:.6}")?;
            }
        }
        self.writer.write_all(b"\n\n")
    }
}

impl<W: Write> OutputSink for GnuplotTextSink<W> {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        self.write_frame(snapshot).map_err(|e| SinkError::Io {
            step,
            reason: e.to_string(),
        })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::Io {
            step: StepId(self.frames),
            reason: e.to_string(),
        })
    }
}

// ── GnuplotScript ──────────────────────────────────────────────────

/// Script that renders a [`GnuplotTextSink`] file as an animated GIF.
#[derive(Clone, Debug, PartialEq)]
pub struct GnuplotScript {
    /// Mesh rows (x range upper bound).
    pub rows: usize,
    /// Mesh columns (y range upper bound).
    pub cols: usize,
    /// Number of frames to animate, starting at index 1.
    pub frames: u64,
    /// Data file written by the text sink.
    pub data_path: PathBuf,
    /// GIF to produce.
    pub gif_path: PathBuf,
    /// Delay between frames, in hundredths of a second. Default: 40.
    pub delay: u32,
}

impl GnuplotScript {
    /// Script for a `rows × cols` run of `total_steps` steps.
    pub fn new(rows: usize, cols: usize, total_steps: u64, data_path: impl Into<PathBuf>) -> Self {
        Self {
            rows,
            cols,
            frames: total_steps,
            data_path: data_path.into(),
            gif_path: PathBuf::from("grid.gif"),
            delay: 40,
        }
    }

    /// Render the script text.
    pub fn render(&self) -> String {
        let mut s = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(s, "set colorbox vertical");
        let _ = writeln!(s, "set pm3d at s explicit");
        let _ = writeln!(s, "set dgrid3d");
        let _ = writeln!(s, "set xrange [0:{}]", self.rows);
        let _ = writeln!(s, "set yrange [0:{}]", self.cols);
        let _ = writeln!(s, "set hidden3d");
        let _ = writeln!(s, "set xlabel \"Rows\"");
        let _ = writeln!(s, "set ylabel \"Columns\"");
        let _ = writeln!(s, "set zlabel \"U\"");
        let _ = writeln!(s, "set term gif animate delay {}", self.delay);
        let _ = writeln!(s, "set output \"{}\"", self.gif_path.display());
        let _ = writeln!(
            s,
            "do for [i=1:{}] {{ splot \"{}\" index i w pm3d title \"Step \".(i) }}",
            self.frames,
            self.data_path.display()
        );
        s
    }

    /// Write the rendered script to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.render())
    }
}
