use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    time::{Duration, Instant},
};

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::{debug, info, warn};

new_key_type! { pub struct TextureId; }

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not start loader thread for {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub enum TextureState {
    Pending,
    Ready(Arc<image::RgbaImage>),
    /// Reason is reported by a warning when the load settles
    Failed,
}

impl TextureState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, TextureState::Pending)
    }
}

/// What a material texture slot samples at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBinding {
    /// Decoded image is available
    Loaded(TextureId),
    /// Slot is not used by the material, samples white
    Neutral,
    /// Image is still loading or failed to load, samples black
    Blank,
}

#[derive(Debug)]
struct TextureEntry {
    label: String,
    state: TextureState,
}

type LoadResult = (TextureId, Result<image::RgbaImage, TextureLoadError>);

/// Fire-and-forget texture loading
///  - each `load` spawns a short lived decoding thread
///  - finished images are collected by `poll` on the thread owning the store
///  - `generation` changes every time some entry settles
pub struct TextureStore {
    entries:    SlotMap<TextureId, TextureEntry>,
    sender:     mpsc::Sender<LoadResult>,
    receiver:   mpsc::Receiver<LoadResult>,
    generation: u64,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

// Construction
impl TextureStore {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            entries: SlotMap::with_key(),
            sender,
            receiver,
            generation: 0,
        }
    }

    /// Starts decoding the image on a background thread, returned handle is usable immediately.
    #[profiler::function]
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref().to_path_buf();
        let id = self.entries.insert(TextureEntry {
            label: path.display().to_string(),
            state: TextureState::Pending,
        });

        debug!("Requesting texture {:?} from {}", id, path.display());

        let sender = self.sender.clone();
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("texture loader".into())
            .spawn(move || {
                let result = image::open(&thread_path)
                    .map(|image| image.to_rgba8())
                    .map_err(|source| TextureLoadError::Decode { path: thread_path, source });
                // store may be gone already, nobody waits for the result then
                let _ = sender.send((id, result));
            });

        if let Err(source) = spawned {
            self.settle(id, Err(TextureLoadError::Spawn { path, source }));
        }
        id
    }
}

// Progress
impl TextureStore {
    /// Collects finished loads without blocking, returns number of entries settled by this call.
    #[profiler::function]
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;
        while let Ok((id, result)) = self.receiver.try_recv() {
            self.settle(id, result);
            settled += 1;
        }
        settled
    }

    /// Blocks until every requested texture is settled or `timeout` elapses.
    /// Returns true when nothing is pending anymore.
    #[profiler::function]
    pub fn wait_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.pending_count() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok((id, result)) => self.settle(id, result),
                Err(_) => break,
            }
        }

        let pending = self.pending_count();
        if pending > 0 {
            warn!("{} textures still loading after {:?}, continuing without them", pending, timeout);
        }
        pending == 0
    }

    fn settle(&mut self, id: TextureId, result: Result<image::RgbaImage, TextureLoadError>) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        entry.state = match result {
            Ok(image) => {
                info!("Texture {} loaded ({}x{})", entry.label, image.width(), image.height());
                TextureState::Ready(Arc::new(image))
            }
            Err(error) => {
                warn!("Texture {} failed to load and will render blank: {}", entry.label, error);
                TextureState::Failed
            }
        };
        self.generation += 1;
    }
}

// Getters
impl TextureStore {
    pub fn state(&self, id: TextureId) -> Option<&TextureState> {
        self.entries.get(id).map(|entry| &entry.state)
    }

    /// Every decoded image together with its handle.
    pub fn ready(&self) -> impl Iterator<Item = (TextureId, &Arc<image::RgbaImage>)> {
        self.entries.iter().filter_map(|(id, entry)| match &entry.state {
            TextureState::Ready(image) => Some((id, image)),
            _ => None,
        })
    }

    pub fn label(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id).map(|entry| entry.label.as_str())
    }

    /// Resolves an optional material slot to what should be sampled this frame.
    pub fn binding(&self, slot: Option<TextureId>) -> TextureBinding {
        match slot {
            None => TextureBinding::Neutral,
            Some(id) => match self.state(id) {
                Some(TextureState::Ready(_)) => TextureBinding::Loaded(id),
                _ => TextureBinding::Blank,
            },
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|entry| !entry.state.is_settled()).count()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("earth-scene-{}-{}.png", std::process::id(), name));
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn missing_file_fails_and_renders_blank() {
        let mut store = TextureStore::new();
        let id = store.load("this/texture/does/not/exist.jpg");
        assert_eq!(store.binding(Some(id)), TextureBinding::Blank);

        assert!(store.wait_until_settled(Duration::from_secs(10)));
        assert!(matches!(store.state(id), Some(TextureState::Failed)));
        assert_eq!(store.binding(Some(id)), TextureBinding::Blank);
    }

    #[test]
    fn valid_image_becomes_ready() {
        let path = temp_png("valid", 4, 2);
        let mut store = TextureStore::new();
        let id = store.load(&path);

        assert!(store.wait_until_settled(Duration::from_secs(10)));
        let Some(TextureState::Ready(image)) = store.state(id) else {
            panic!("texture is not ready: {:?}", store.state(id));
        };
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(store.binding(Some(id)), TextureBinding::Loaded(id));
        assert!(store.generation() > 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn waiting_respects_timeout() {
        let mut store = TextureStore::new();
        // entry without loader thread never settles
        let id = store.entries.insert(TextureEntry {
            label: "stuck".into(),
            state: TextureState::Pending,
        });

        let start = Instant::now();
        assert!(!store.wait_until_settled(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(store.binding(Some(id)), TextureBinding::Blank);
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn unused_slot_is_neutral() {
        let store = TextureStore::new();
        assert_eq!(store.binding(None), TextureBinding::Neutral);
    }
}
