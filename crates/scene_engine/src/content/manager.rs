//! Named texture caches and their background loader

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::content::ContentError;
use crate::core::ProgressCallback;
use crate::graphics::{Texture, TextureHandle};
use crate::scene::Entity;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Texture cache keyed by canonical file path
///
/// Loading the same file twice returns the same handle. Safe to share
/// between threads; the background loader holds an `Arc` to the manager it
/// fills.
#[derive(Debug)]
pub struct ContentManager {
    name: String,
    time_created: f32,
    textures: Mutex<HashMap<PathBuf, TextureHandle>>,
}

impl ContentManager {
    /// Create an empty cache
    pub fn new(name: impl Into<String>, time_created: f32) -> Self {
        Self { name: name.into(), time_created, textures: Mutex::new(HashMap::new()) }
    }

    /// Number of cached textures
    pub fn len(&self) -> usize {
        lock(&self.textures).len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a texture, decoding it only on the first request
    pub fn load_texture(&self, path: impl AsRef<Path>) -> Result<TextureHandle, ContentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ContentError::NotFound { path: path.to_path_buf() });
        }
        let key = path.canonicalize()?;

        if let Some(texture) = lock(&self.textures).get(&key) {
            return Ok(texture.clone());
        }

        // Decode without holding the lock; a concurrent load of the same file keeps the first insert.
        let texture = Arc::new(Texture::decode(&key)?);
        let texture = lock(&self.textures).entry(key).or_insert(texture).clone();

        log::debug!("Content '{}' loaded {}", self.name, path.display());
        Ok(texture)
    }

    /// Load a texture on a background thread
    ///
    /// `progress` receives `100.0` from the loader thread once the texture is
    /// cached. A missing file fails immediately without starting a thread.
    pub fn load_texture_async(
        self: &Arc<Self>,
        path: impl AsRef<Path>,
        progress: Option<ProgressCallback>,
    ) -> TextureLoad {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return TextureLoad::failed(ContentError::NotFound { path });
        }

        let (sender, receiver) = bounded(1);
        let waker: Arc<Mutex<Option<Waker>>> = Arc::new(Mutex::new(None));

        let manager = Arc::clone(self);
        let loader_path = path.clone();
        let loader_waker = Arc::clone(&waker);
        let spawned = thread::Builder::new().name(format!("content-{}", self.name)).spawn(move || {
            let result = manager.load_texture(&loader_path);
            if result.is_ok() {
                if let Some(progress) = progress {
                    progress(100.0);
                }
            }

            // The receiving future may already be gone.
            let _ = sender.send(result);
            if let Some(waker) = lock(&loader_waker).take() {
                waker.wake();
            }
        });

        if let Err(error) = spawned {
            return TextureLoad::failed(ContentError::Io(error));
        }

        TextureLoad { path, state: LoadState::Running { receiver, waker } }
    }

    /// Drop every cached texture
    pub fn release(&self) {
        let mut textures = lock(&self.textures);
        let count = textures.len();
        textures.clear();
        log::info!("Content '{}' released {count} texture(s)", self.name);
    }
}

impl Entity for ContentManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_created(&self) -> f32 {
        self.time_created
    }
}

enum LoadState {
    Running { receiver: Receiver<Result<TextureHandle, ContentError>>, waker: Arc<Mutex<Option<Waker>>> },
    Failed(Option<ContentError>),
}

/// Future resolving to a texture loaded by [`ContentManager::load_texture_async`]
pub struct TextureLoad {
    path: PathBuf,
    state: LoadState,
}

impl TextureLoad {
    fn failed(error: ContentError) -> Self {
        let path = match &error {
            ContentError::NotFound { path } => path.clone(),
            _ => PathBuf::new(),
        };
        Self { path, state: LoadState::Failed(Some(error)) }
    }

    /// File being loaded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block the calling thread until the load finishes
    pub fn wait(self) -> Result<TextureHandle, ContentError> {
        match self.state {
            LoadState::Running { receiver, .. } => receiver
                .recv()
                .unwrap_or(Err(ContentError::LoadInterrupted { path: self.path })),
            LoadState::Failed(error) => Err(error.unwrap_or(ContentError::LoadInterrupted { path: self.path })),
        }
    }
}

impl Future for TextureLoad {
    type Output = Result<TextureHandle, ContentError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            LoadState::Failed(error) => Poll::Ready(Err(error
                .take()
                .unwrap_or_else(|| ContentError::LoadInterrupted { path: this.path.clone() }))),
            LoadState::Running { receiver, waker } => {
                // Register before checking so a result sent in between still wakes us.
                *lock(waker) = Some(cx.waker().clone());
                match receiver.try_recv() {
                    Ok(result) => Poll::Ready(result),
                    Err(TryRecvError::Empty) => Poll::Pending,
                    Err(TryRecvError::Disconnected) => {
                        Poll::Ready(Err(ContentError::LoadInterrupted { path: this.path.clone() }))
                    }
                }
            }
        }
    }
}

/// Every live content manager, by name
#[derive(Debug, Default)]
pub struct ContentManagers {
    managers: HashMap<String, Arc<ContentManager>>,
}

impl ContentManagers {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The manager with this name, created on first use
    pub fn get_or_create(&mut self, name: &str, time_created: f32) -> Arc<ContentManager> {
        let manager = self.managers.entry(name.to_string()).or_insert_with(|| {
            log::debug!("Creating content manager '{name}'");
            Arc::new(ContentManager::new(name, time_created))
        });
        Arc::clone(manager)
    }

    /// The manager with this name, if it exists
    pub fn get(&self, name: &str) -> Option<&Arc<ContentManager>> {
        self.managers.get(name)
    }

    /// Release and forget a manager; returns whether one existed
    pub fn remove(&mut self, name: &str) -> bool {
        match self.managers.remove(name) {
            Some(manager) => {
                manager.release();
                true
            }
            None => false,
        }
    }

    /// Number of managers
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Whether there are no managers
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
