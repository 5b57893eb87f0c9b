//! Render progress events as terminal text.

use std::io::Write;

use carto::types::{IntegrationMetrics, ProgressEvent, ProgressSink};

/// Writes progress lines to any writer, usually stdout.
///
/// Steps without detail update a single `\r`-rewritten percentage line;
/// detailed steps print one line each. The final summary always ends with
/// a newline. Write failures are ignored: progress output never aborts a
/// transform.
#[derive(Debug)]
pub struct TerminalProgress<W: Write> {
    out: W,
    last_percent: Option<u32>,
}

impl<W: Write> TerminalProgress<W> {
    /// Render to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_percent: None,
        }
    }

    /// Release the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn summary(&mut self, m: &IntegrationMetrics) {
        if self.last_percent.take().is_some() {
            let _ = writeln!(self.out);
        }
        let _ = writeln!(
            self.out,
            "done: {} points, {} steps ({} rejected), max displacement {:.4}, {:.1} ms",
            m.points,
            m.accepted_steps,
            m.rejected_steps,
            m.max_displacement,
            m.total_us as f64 / 1000.0
        );
    }
}

impl<W: Write> ProgressSink for TerminalProgress<W> {
    fn report(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Step {
                fraction,
                detail: Some(d),
            } => {
                let _ = writeln!(
                    self.out,
                    "t = {fraction:.6}  h = {:.3e}  error = {:.3e}  rejected = {}",
                    d.step, d.error, d.rejected
                );
            }
            ProgressEvent::Step {
                fraction,
                detail: None,
            } => {
                let percent = (fraction * 100.0).floor() as u32;
                if self.last_percent != Some(percent) {
                    let _ = write!(self.out, "\r{percent:3}%");
                    let _ = self.out.flush();
                    self.last_percent = Some(percent);
                }
            }
            ProgressEvent::Finished { metrics } => self.summary(metrics),
        }
    }
}
