//! Terminal spinner that follows a shared [`Progress`] counter.

use refshelf_engine::Progress;
use std::io::{self, Write};
use std::time::Duration;
use tokio::task::JoinHandle;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// A running spinner task. Stop it with [`Spinner::stop`].
pub struct Spinner {
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Spawn the spinner. It redraws one stderr line until stopped.
    pub fn start(label: &str, progress: Progress) -> Self {
        let label = label.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            for frame in FRAMES.iter().cycle() {
                ticker.tick().await;
                if render(&mut io::stderr(), *frame, &label, &progress).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancel the task, wait for it to finish, and clear its line.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        let mut err = io::stderr();
        let _ = write!(err, "\r\x1b[2K");
        let _ = err.flush();
    }
}

fn render(out: &mut impl Write, frame: char, label: &str, progress: &Progress) -> io::Result<()> {
    write!(
        out,
        "\r{} {} ({}/{})",
        frame,
        label,
        progress.done(),
        progress.total()
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_counts() {
        let progress = Progress::new(3);
        progress.incr();
        let mut out = Vec::new();
        render(&mut out, '/', "Fetching metadata", &progress).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\r/ Fetching metadata (1/3)");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_finishes_the_task() {
        let spinner = Spinner::start("Working", Progress::new(1));
        tokio::time::sleep(Duration::from_millis(350)).await;
        spinner.stop().await;
    }
}
