//! Markup rendering pipeline
//!
//! The editor never renders markdown inline. Text changes enqueue a render
//! job into a [`RenderQueue`]; jobs complete at later turn boundaries and the
//! view applies each completed markup wholesale. Jobs are fire-and-forget:
//! nothing is cancelled or debounced, so when jobs complete out of submission
//! order the one that completes last is the one the user sees, even if it
//! rendered older text.
//!
//! The renderer itself is a plain text-to-markup function. The default one
//! converts markdown to an HTML fragment via comrak.

use std::collections::VecDeque;
use std::rc::Rc;

use comrak::{markdown_to_html, Options};
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// A pure text-to-markup function.
pub type RenderFn = dyn Fn(&str) -> String;

/// Convert markdown source into an HTML fragment.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::default();

    // Enable common extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.header_ids = Some(String::new());

    // Render options
    options.render.unsafe_ = true; // Allow raw HTML

    markdown_to_html(source, &options)
}

/// The default renderer, [`render_markdown`] in callable form.
pub fn markdown_renderer() -> Rc<RenderFn> {
    Rc::new(render_markdown)
}

// ─────────────────────────────────────────────────────────────────────────────
// Render Queue
// ─────────────────────────────────────────────────────────────────────────────

/// A render in flight.
struct RenderJob {
    id: u64,
    source: String,
    turns_left: u32,
}

/// A finished render, handed back by [`RenderQueue::pump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRender {
    #[allow(dead_code)]
    pub id: u64,
    pub markup: String,
}

/// Queue of in-flight render jobs, advanced one turn per [`RenderQueue::pump`].
///
/// Each job waits a fixed number of turns before completing; the wait is
/// sampled from the queue's current latency at submission time, so jobs
/// submitted under different latencies can complete out of order. A job never
/// completes in the turn that submitted it.
pub struct RenderQueue {
    renderer: Rc<RenderFn>,
    jobs: VecDeque<RenderJob>,
    next_id: u64,
    latency_turns: u32,
}

impl RenderQueue {
    /// Default number of turns between submission and completion.
    pub const DEFAULT_LATENCY_TURNS: u32 = 1;

    pub fn new(renderer: Rc<RenderFn>) -> Self {
        Self {
            renderer,
            jobs: VecDeque::new(),
            next_id: 0,
            latency_turns: Self::DEFAULT_LATENCY_TURNS,
        }
    }

    /// Set how many turns future submissions wait before completing.
    /// Values below one are raised to one.
    pub fn set_latency_turns(&mut self, turns: u32) {
        self.latency_turns = turns.max(1);
    }

    /// Queue a render of `source`. Returns the job id.
    pub fn submit(&mut self, source: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        debug!(
            "Render job {} submitted ({} bytes, {} turn(s))",
            id,
            source.len(),
            self.latency_turns
        );
        self.jobs.push_back(RenderJob {
            id,
            source: source.to_owned(),
            turns_left: self.latency_turns,
        });
        id
    }

    /// Number of jobs still in flight.
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    /// Advance one turn. Jobs whose wait elapsed render now and are returned
    /// in submission order; the rest stay queued.
    pub fn pump(&mut self) -> Vec<CompletedRender> {
        for job in &mut self.jobs {
            job.turns_left = job.turns_left.saturating_sub(1);
        }

        let mut completed = Vec::new();
        let mut waiting = VecDeque::with_capacity(self.jobs.len());
        while let Some(job) = self.jobs.pop_front() {
            if job.turns_left == 0 {
                let markup = (self.renderer)(&job.source);
                debug!("Render job {} completed ({} bytes)", job.id, markup.len());
                completed.push(CompletedRender { id: job.id, markup });
            } else {
                waiting.push_back(job);
            }
        }
        self.jobs = waiting;
        completed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
