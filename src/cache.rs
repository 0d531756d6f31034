use crate::compiler::{compile, CompiledProgram};
use crate::gradient::GradientMetadata;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

/// Compiled programs are pure functions of their metadata, so refreshes that
/// only move a shape (or re-sync its layer) can reuse the previous program
/// instead of re-templating it.
pub struct ProgramCache {
    programs: LruCache<u64, CompiledProgram>,
}

impl ProgramCache {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            programs: LruCache::new(size),
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Returns the program for `metadata`, compiling and caching on a miss.
    /// `None` exactly when [`compile`] returns `None`.
    pub fn get_or_compile(&mut self, metadata: &GradientMetadata) -> Option<CompiledProgram> {
        let key = metadata.cache_key();
        if let Some(program) = self.programs.get(&key) {
            return Some(program.clone());
        }
        let program = compile(metadata)?;
        self.programs.put(key, program.clone());
        Some(program)
    }
}

const DEFAULT_PROGRAM_CACHE_SIZE: usize = 64;

static GLOBAL_PROGRAM_CACHE: OnceLock<Mutex<ProgramCache>> = OnceLock::new();

/// The process-wide program cache shared by every effect refresh.
pub fn global_program_cache() -> &'static Mutex<ProgramCache> {
    GLOBAL_PROGRAM_CACHE.get_or_init(|| {
        Mutex::new(ProgramCache::new(
            NonZeroUsize::new(DEFAULT_PROGRAM_CACHE_SIZE).unwrap(),
        ))
    })
}

/// Compile through the global cache.
pub(crate) fn cached_compile(metadata: &GradientMetadata) -> Option<CompiledProgram> {
    global_program_cache()
        .lock()
        .unwrap()
        .get_or_compile(metadata)
}
