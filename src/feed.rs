// SPDX-License-Identifier: MIT
//
// Fake download feed.
//
// A background thread plays back an endless, randomized package install:
// "Collecting ...", a progress bar that redraws itself, then a tagged
// result line. It only sends strings over a channel; the console drains
// them on each tick. Lines starting with `\r` replace the previous console
// line, which is how the progress bar animates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

/// Packages the feed pretends to install: name, version, size in kB.
const PACKAGES: &[(&str, &str, u32)] = &[
    ("numpy", "1.26.4", 15_800),
    ("pandas", "2.2.1", 11_600),
    ("requests", "2.31.0", 62),
    ("urllib3", "2.2.1", 121),
    ("certifi", "2024.2.2", 163),
    ("matplotlib", "3.8.3", 7_600),
    ("scipy", "1.12.0", 45_900),
    ("pillow", "10.2.0", 2_600),
    ("cryptography", "42.0.5", 2_900),
    ("protobuf", "4.25.3", 294),
    ("grpcio", "1.62.0", 3_800),
    ("torch", "2.2.1", 198_600),
    ("tensorflow", "2.15.0", 475_200),
    ("pyarrow", "15.0.1", 38_300),
    ("lxml", "5.1.0", 4_800),
    ("sqlalchemy", "2.0.28", 3_100),
];

const BAR_WIDTH: usize = 30;

/// Handle to the feed thread. Dropping it stops the thread.
pub struct DownloadFeed {
    rx: Receiver<String>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DownloadFeed {
    /// Start the feed with lines spaced roughly `pace` apart.
    pub fn spawn(pace: Duration) -> Option<Self> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("download-feed".into())
            .spawn(move || run(&tx, &flag, pace));
        match handle {
            Ok(handle) => Some(Self {
                rx,
                stop,
                handle: Some(handle),
            }),
            Err(e) => {
                warn!(error = %e, "download feed not started");
                None
            }
        }
    }

    /// Everything sent since the last call.
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DownloadFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Thread body ─────────────────────────────────────────────────────────────

fn run(tx: &Sender<String>, stop: &AtomicBool, pace: Duration) {
    let mut rng = rand::thread_rng();
    let mut order: Vec<usize> = (0..PACKAGES.len()).collect();

    debug!("download feed started");
    'outer: loop {
        order.shuffle(&mut rng);
        for &i in &order {
            let (name, version, size_kb) = PACKAGES[i];
            for line in install_script(&mut rng, name, version, size_kb) {
                if !pause(stop, pace.mul_f64(rng.gen_range(0.5..1.5))) || tx.send(line).is_err() {
                    break 'outer;
                }
            }
        }
    }
    debug!("download feed stopped");
}

/// Sleep in short slices so `stop` is noticed quickly. `false` if stopped.
fn pause(stop: &AtomicBool, total: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(20);
    let mut left = total;
    while !left.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = left.min(SLICE);
        thread::sleep(step);
        left -= step;
    }
    !stop.load(Ordering::Relaxed)
}

/// The lines for installing one package.
fn install_script(rng: &mut impl Rng, name: &str, version: &str, size_kb: u32) -> Vec<String> {
    let mut lines = vec![
        format!("Collecting {name}=={version}"),
        format!(
            "  Downloading {name}-{version}-cp312-cp312-win_amd64.whl ({})",
            human_size(size_kb)
        ),
    ];

    let steps = rng.gen_range(4..=10);
    for step in 1..=steps {
        let done = size_kb * step / steps;
        lines.push(format!("\r{}", progress_line(done, size_kb)));
    }

    match rng.gen_range(0..10) {
        0 => lines.push(format!(
            "[WARNING] Retrying (Retry(total=4, connect=None, read=None)) after connection broken: /simple/{name}/"
        )),
        1 => lines.push(format!(
            "[ERROR] Could not verify hash for {name}-{version}; falling back to cache"
        )),
        2 => lines.push(format!("[INFO] Using cached {name}-{version}")),
        _ => {}
    }
    lines.push(format!("[SUCCESS] Successfully installed {name}-{version}"));
    lines
}

/// `━━━━━━━━━━━━                   3.1 MB/7.4 MB`
fn progress_line(done_kb: u32, total_kb: u32) -> String {
    let fraction = if total_kb == 0 {
        1.0
    } else {
        f64::from(done_kb.min(total_kb)) / f64::from(total_kb)
    };
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "   {}{} {}/{}",
        "━".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        human_size(done_kb),
        human_size(total_kb)
    )
}

fn human_size(kb: u32) -> String {
    if kb >= 1024 {
        format!("{:.1} MB", f64::from(kb) / 1024.0)
    } else {
        format!("{kb} kB")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
