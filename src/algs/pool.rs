//! Off-thread mesh builds.
//!
//! A [`BuildPool`] owns a dedicated rayon pool. Each submitted
//! [`BuildRequest`] is moved onto it whole, so concurrent builds share no
//! mutable state, and the caller gets a [`BuildTicket`] to collect the
//! result. A build either delivers a complete [`BuiltMesh`] or an error.

use crate::algs::interpolate::ScatteredPointSet;
use crate::mesh_error::MeshError;
use crate::mesh_generation::{
    BathymetrySource, BuiltMesh, GeneratorOutput, MeshBuildOptions, MeshTopologyBuilder,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Everything one build needs, owned.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub generator: GeneratorOutput,
    pub bathymetry: Option<ScatteredPointSet>,
    pub options: MeshBuildOptions,
}

impl BuildRequest {
    pub fn new(generator: GeneratorOutput) -> Self {
        Self {
            generator,
            bathymetry: None,
            options: MeshBuildOptions::default(),
        }
    }

    pub fn with_bathymetry(mut self, bathymetry: ScatteredPointSet) -> Self {
        self.bathymetry = Some(bathymetry);
        self
    }

    pub fn with_options(mut self, options: MeshBuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the build on the current thread.
    pub fn run(&self) -> Result<BuiltMesh, MeshError> {
        MeshTopologyBuilder::new(self.options).build(
            &self.generator,
            self.bathymetry.as_ref().map(|b| b as &dyn BathymetrySource),
        )
    }
}

/// Worker pool for mesh builds.
#[derive(Debug)]
pub struct BuildPool {
    pool: rayon::ThreadPool,
}

impl BuildPool {
    /// Create a pool with `num_threads` workers; 0 lets rayon decide.
    pub fn new(num_threads: usize) -> Result<Self, MeshError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("mesh-build-{i}"))
            .build()
            .map_err(|e| MeshError::Worker(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue a build and return immediately.
    pub fn submit(&self, request: BuildRequest) -> BuildTicket {
        self.submit_with(move || request.run())
    }

    /// Queue an arbitrary build closure.
    ///
    /// A panic inside `build` is caught on the worker and reported on the
    /// ticket as [`MeshError::Worker`]; other queued builds keep running.
    pub fn submit_with<F>(&self, build: F) -> BuildTicket
    where
        F: FnOnce() -> Result<BuiltMesh, MeshError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(build)).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                log::error!("mesh build panicked: {message}");
                Err(MeshError::Worker(format!("build panicked: {message}")))
            });
            // The ticket may have been dropped; nobody is waiting then.
            let _ = tx.send(result);
        });
        BuildTicket { rx }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Handle to a queued build.
#[derive(Debug)]
pub struct BuildTicket {
    rx: Receiver<Result<BuiltMesh, MeshError>>,
}

impl BuildTicket {
    /// Block until the build finishes.
    pub fn wait(self) -> Result<BuiltMesh, MeshError> {
        self.rx.recv().map_err(|_| worker_gone())?
    }

    /// The result if the build has finished, `None` while it is running.
    pub fn try_result(&self) -> Option<Result<BuiltMesh, MeshError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_gone())),
        }
    }
}

fn worker_gone() -> MeshError {
    MeshError::Worker("build worker exited without reporting a result".into())
}
