//! Background image loading
//!
//! Decoding a dropped panorama can take long enough to hitch the render
//! loop, so reads and decodes run on a short-lived background thread and
//! the render thread polls for the finished result once per frame.
//!
//! Requests are tagged with a generation counter; only the most recent
//! request's result is ever delivered. Dropping a second file while the
//! first is still decoding supersedes it; there is no queue.

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::texture::{PanoramaImage, TextureError};

struct LoadResult {
    generation: u64,
    path: PathBuf,
    image: Result<PanoramaImage, TextureError>,
}

/// Asynchronous panorama image loader
pub struct ImageLoader {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    generation: u64,
}

impl ImageLoader {
    /// Create an idle loader
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            generation: 0,
        }
    }

    /// Start decoding an image file, superseding any in-flight request
    pub fn request(&mut self, path: PathBuf) {
        self.generation += 1;
        let generation = self.generation;
        let sender = self.sender.clone();

        log::info!("Loading panorama from {:?}", path);
        std::thread::spawn(move || {
            let image = PanoramaImage::from_path(&path);
            // The receiver only disappears on shutdown; a failed send is fine
            let _ = sender.send(LoadResult {
                generation,
                path,
                image,
            });
        });
    }

    /// Take the newest completed result, if any.
    ///
    /// Results from superseded requests are discarded. Decode failures are
    /// logged and swallowed so the current surface stays up.
    pub fn poll(&mut self) -> Option<PanoramaImage> {
        let mut latest = None;

        while let Ok(result) = self.receiver.try_recv() {
            if result.generation != self.generation {
                log::debug!("Discarding superseded load of {:?}", result.path);
                continue;
            }
            match result.image {
                Ok(image) => {
                    log::info!(
                        "Decoded {:?} ({}x{})",
                        result.path,
                        image.width,
                        image.height
                    );
                    latest = Some(image);
                }
                Err(e) => {
                    log::warn!("Failed to load {:?}: {}", result.path, e);
                }
            }
        }

        latest
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn write_test_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "panorama_viewer_{}_{}.png",
            std::process::id(),
            name
        ));
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn poll_until(loader: &mut ImageLoader, timeout: Duration) -> Option<PanoramaImage> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(image) = loader.poll() {
                return Some(image);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_delivers_decoded_image() {
        let path = write_test_png("single", 8, 4);
        let mut loader = ImageLoader::new();
        loader.request(path.clone());

        let image = poll_until(&mut loader, Duration::from_secs(5)).expect("load timed out");
        assert_eq!((image.width, image.height), (8, 4));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_newest_request_wins() {
        let first = write_test_png("first", 2, 2);
        let second = write_test_png("second", 6, 3);

        let mut loader = ImageLoader::new();
        loader.request(first.clone());
        loader.request(second.clone());

        let image = poll_until(&mut loader, Duration::from_secs(5)).expect("load timed out");
        assert_eq!((image.width, image.height), (6, 3));

        // Whatever the first request produced never surfaces
        std::thread::sleep(Duration::from_millis(200));
        assert!(loader.poll().is_none());

        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(second);
    }

    #[test]
    fn test_unreadable_file_swallowed() {
        let mut loader = ImageLoader::new();
        loader.request(PathBuf::from("/nonexistent/panorama.jpg"));

        std::thread::sleep(Duration::from_millis(200));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_idle_poll_is_empty() {
        let mut loader = ImageLoader::new();
        assert!(loader.poll().is_none());
    }
}
