use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::strip::chart::ChartDocument;
use crate::strip::error::StripError;
use crate::strip::record;
use crate::strip::render::{RenderBackend, RenderOptions};

/// Directory scanned for strip files.
pub const SOURCE_DIR: &str = "alarms";
/// Directory the rendered images land in.
pub const DEST_DIR: &str = "alarm_images";
/// How long the collector waits without any render finishing before the
/// outstanding strips are written off as hung.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one full pass over the source directory.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub rendered: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Fully assembled render work for one strip file. Read, parse and
/// normalization happen up front; only render + write run on a worker.
struct RenderJob {
    stem: String,
    output: PathBuf,
    document: ChartDocument,
}

struct JobOutcome {
    stem: String,
    result: Result<PathBuf, StripError>,
}

/// Orchestrates one render pass: assembles jobs up front, then feeds a
/// bounded worker pool and joins over the per-file outcomes.
pub struct StripRun<B> {
    backend: Arc<B>,
    options: RenderOptions,
    workers: usize,
    render_timeout: Duration,
}

impl<B: RenderBackend + Send + Sync + 'static> StripRun<B> {
    pub fn new(backend: B) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            backend: Arc::new(backend),
            options: RenderOptions::default(),
            workers,
            render_timeout: RENDER_TIMEOUT,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Render every strip file in `source` into `dest`. Per-file failures are
    /// logged and counted; only an unreadable source directory or an
    /// uncreatable destination fails the run itself.
    pub fn execute(&self, source: &Path, dest: &Path) -> Result<RunSummary, StripError> {
        let started = Instant::now();
        fs::create_dir_all(dest)?;
        let mut failed = 0usize;
        let mut jobs = VecDeque::new();
        for path in list_strip_files(source)? {
            match prepare_job(&path, dest) {
                Ok(job) => jobs.push_back(job),
                Err(err) => {
                    log::error!("skipping {}: {err}", path.display());
                    failed += 1;
                }
            }
        }
        log::info!(
            "rendering {} strip file(s) with {} worker(s)",
            jobs.len(),
            self.workers.min(jobs.len().max(1))
        );
        let rendered = self.render_all(jobs, &mut failed);
        let summary = RunSummary {
            rendered,
            failed,
            elapsed: started.elapsed(),
        };
        log::info!(
            "rendered {} strip(s), {} failed, in {:.2?}",
            summary.rendered,
            summary.failed,
            summary.elapsed
        );
        Ok(summary)
    }

    fn render_all(&self, jobs: VecDeque<RenderJob>, failed: &mut usize) -> usize {
        let expected = jobs.len();
        if expected == 0 {
            return 0;
        }
        let queue = Arc::new(Mutex::new(jobs));
        let (outcome_tx, outcome_rx) = mpsc::channel::<JobOutcome>();
        for _ in 0..self.workers.min(expected) {
            let queue = Arc::clone(&queue);
            let backend = Arc::clone(&self.backend);
            let options = self.options;
            let outcome_tx = outcome_tx.clone();
            thread::spawn(move || {
                while let Some(job) = next_job(&queue) {
                    let result = render_one(backend.as_ref(), &job, &options);
                    let outcome = JobOutcome {
                        stem: job.stem,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(outcome_tx);
        let mut rendered = 0usize;
        let mut completed = 0usize;
        while completed < expected {
            match outcome_rx.recv_timeout(self.render_timeout) {
                Ok(outcome) => {
                    completed += 1;
                    match outcome.result {
                        Ok(path) => {
                            rendered += 1;
                            log::info!("{} -> {}", outcome.stem, path.display());
                        }
                        Err(err) => {
                            *failed += 1;
                            log::error!("failed to render {}: {err}", outcome.stem);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let outstanding = expected - completed;
                    *failed += outstanding;
                    log::error!(
                        "{}",
                        StripError::RenderTimeout {
                            seconds: self.render_timeout.as_secs(),
                            outstanding,
                        }
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let outstanding = expected - completed;
                    *failed += outstanding;
                    log::error!(
                        "render workers exited early; {outstanding} strip(s) unaccounted for"
                    );
                    break;
                }
            }
        }
        rendered
    }
}

fn next_job(queue: &Mutex<VecDeque<RenderJob>>) -> Option<RenderJob> {
    queue.lock().ok()?.pop_front()
}

fn render_one<B: RenderBackend>(
    backend: &B,
    job: &RenderJob,
    options: &RenderOptions,
) -> Result<PathBuf, StripError> {
    let png = backend.render(&job.document, options)?;
    fs::write(&job.output, png)?;
    Ok(job.output.clone())
}

/// Regular files in the source directory, sorted by name so submission order
/// is stable between runs.
fn list_strip_files(source: &Path) -> Result<Vec<PathBuf>, StripError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn prepare_job(path: &Path, dest: &Path) -> Result<RenderJob, StripError> {
    let text = fs::read_to_string(path)?;
    let records = record::parse_strip(&text)?;
    let document = ChartDocument::from_records(&records)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = output_stem(&name).to_owned();
    Ok(RenderJob {
        output: dest.join(format!("{stem}.png")),
        stem,
        document,
    })
}

/// Everything up to the first `.` of the input file name.
fn output_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::plot::ChartStyle;
    use crate::strip::render::PlottersBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "stripshot-test-{}-{tag}-{id}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_run<B: RenderBackend + Send + Sync + 'static>(backend: B) -> StripRun<B> {
        StripRun::new(backend)
            .with_workers(2)
            .with_options(RenderOptions {
                window_width: 300,
                strip_height: 80,
            })
            .with_render_timeout(Duration::from_secs(10))
    }

    fn output_names(dest: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Backend that refuses documents containing a given label; used to prove
    /// one bad render never takes the rest of the run down with it.
    struct RejectingBackend {
        reject_label: String,
    }

    impl RenderBackend for RejectingBackend {
        fn render(
            &self,
            document: &ChartDocument,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>, StripError> {
            if document
                .strips
                .iter()
                .any(|s| s.label == self.reject_label)
            {
                return Err(StripError::Plot("backend rejected strip".into()));
            }
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    #[test]
    fn output_stem_drops_everything_after_the_first_dot() {
        assert_eq!(output_stem("strip_01.session.json"), "strip_01");
        assert_eq!(output_stem("plain.json"), "plain");
        assert_eq!(output_stem("noext"), "noext");
    }

    #[test]
    fn run_isolates_unparsable_files() {
        let source = temp_dir("iso-src");
        let dest = temp_dir("iso-dst");
        fs::write(
            source.join("a.json"),
            r#"[{"Label":"II","Text":"0,1000,-1000"}]"#,
        )
        .unwrap();
        fs::write(source.join("b.json"), "this is not json").unwrap();
        fs::write(
            source.join("c.json"),
            r#"[{"Label":"V","Text":"5,10,-5"}]"#,
        )
        .unwrap();

        let summary = small_run(PlottersBackend::new(ChartStyle::default()))
            .execute(&source, &dest)
            .unwrap();
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(output_names(&dest), ["a.png", "c.png"]);
    }

    #[test]
    fn render_failure_does_not_block_other_files() {
        let source = temp_dir("rej-src");
        let dest = temp_dir("rej-dst");
        for (name, label) in [("a.json", "II"), ("b.json", "V"), ("c.json", "aVF")] {
            fs::write(
                source.join(name),
                format!(r#"[{{"Label":"{label}","Text":"1,2,3"}}]"#),
            )
            .unwrap();
        }

        let summary = small_run(RejectingBackend {
            reject_label: "V".to_owned(),
        })
        .execute(&source, &dest)
        .unwrap();
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(output_names(&dest), ["a.png", "c.png"]);
    }

    #[test]
    fn rerun_reproduces_the_same_output_names() {
        let source = temp_dir("rerun-src");
        fs::write(
            source.join("strip_01.session.json"),
            r#"[{"Label":"II","Text":"0,100"}]"#,
        )
        .unwrap();
        fs::write(
            source.join("strip_02.session.json"),
            r#"[{"Label":"V","Text":"0,-100"}]"#,
        )
        .unwrap();

        let run = small_run(PlottersBackend::new(ChartStyle::default()));
        let dest = temp_dir("rerun-dst1");
        run.execute(&source, &dest).unwrap();
        let first = output_names(&dest);
        assert_eq!(first, ["strip_01.png", "strip_02.png"]);

        let dest2 = temp_dir("rerun-dst2");
        run.execute(&source, &dest2).unwrap();
        assert_eq!(output_names(&dest2), first);
    }

    /// Backend that never returns; the collector timeout must turn it into a
    /// counted failure instead of blocking the run.
    struct HangingBackend;

    impl RenderBackend for HangingBackend {
        fn render(
            &self,
            _document: &ChartDocument,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>, StripError> {
            thread::sleep(Duration::from_secs(60));
            Ok(Vec::new())
        }
    }

    #[test]
    fn hung_render_is_surfaced_as_failure() {
        let source = temp_dir("hang-src");
        let dest = temp_dir("hang-dst");
        fs::write(source.join("a.json"), r#"[{"Label":"II","Text":"1,2"}]"#).unwrap();

        let summary = StripRun::new(HangingBackend)
            .with_workers(1)
            .with_render_timeout(Duration::from_millis(100))
            .execute(&source, &dest)
            .unwrap();
        assert_eq!(summary.rendered, 0);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn empty_source_directory_yields_an_empty_summary() {
        let source = temp_dir("empty-src");
        let dest = temp_dir("empty-dst");
        let summary = small_run(RejectingBackend {
            reject_label: String::new(),
        })
        .execute(&source, &dest)
        .unwrap();
        assert_eq!(summary.rendered, 0);
        assert_eq!(summary.failed, 0);
    }
}
