use instant::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.1}ms", seconds * 1000.0)
    } else {
        format!("{:.4}s", seconds)
    }
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
}

/// Hierarchical timing of the pipeline stages. Spans are started and stopped by name, nest
/// arbitrarily, and the whole tree is logged when the outermost timer is dropped. Warnings
/// collected along the way are repeated at the end, so they don't get lost in the noise.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<TimerSpan>,
    outermost_name: String,
    warnings: Vec<String>,
    quiet: bool,
}

impl Timer {
    pub fn new<I: Into<String>>(name: I) -> Timer {
        let name = name.into();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            warnings: Vec::new(),
            quiet: false,
        };
        t.start(name);
        t
    }

    /// A timer that doesn't log anything. Useful in tests.
    pub fn throwaway() -> Timer {
        let mut t = Timer::new("throwaway");
        t.quiet = true;
        t
    }

    pub fn start<I: Into<String>>(&mut self, name: I) {
        let name = name.into();
        if !self.quiet {
            debug!("{}...", name);
        }
        self.stack.push(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
        });
    }

    pub fn stop<I: AsRef<str>>(&mut self, name: I) {
        let name = name.as_ref();
        let span = match self.stack.pop() {
            Some(span) => span,
            None => {
                warn!("Timer stopped {}, but nothing was started", name);
                return;
            }
        };
        if span.name != name {
            warn!("Timer stopped {}, but {} is the current span", name, span.name);
        }
        let line = format!(
            "{} took {}",
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(parent) => {
                parent.nested_results.push(format!("{}- {}", padding, line));
                parent.nested_results.extend(span.nested_results);
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }
    }

    /// Remember a problem and repeat it when the timer finishes.
    pub fn warn(&mut self, line: String) {
        if !self.quiet {
            warn!("{}", line);
        }
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Used to end the scope of a timer early.
    pub fn done(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        let name = self.outermost_name.clone();
        // Close anything left open, including the outermost span
        while let Some(span) = self.stack.last() {
            let current = span.name.clone();
            self.stop(current);
        }
        if self.quiet {
            return;
        }
        info!("{} finished", name);
        for line in &self.results {
            info!("{}", line);
        }
        if !self.warnings.is_empty() {
            info!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                info!("  {}", line);
            }
        }
    }
}
