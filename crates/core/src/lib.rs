//! Core rendering pipeline for the spinning-object demo.
//!
//! Everything display-library-specific lives behind the `DisplayBackend`
//! trait, with the windowed implementation in the frontend crate; this
//! crate owns the geometry, the software rasterizer, the dirty-region
//! bookkeeping and the frame protocol.

pub mod backend;
pub mod color;
pub mod dirty;
pub mod error;
pub mod geometry;
pub mod hud;
pub mod presenter;
pub mod raster;
pub mod rect;
pub mod state;
pub mod surface;
pub mod toolkit;
pub mod transform;
pub mod zbuffer;

pub use backend::{DisplayBackend, MemoryBackend};
pub use error::{InitError, PresentError};
pub use geometry::{Mesh, MeshVariant, Topology, Vertex};
pub use presenter::{Bitmap, DemoAssets, Presenter};
pub use rect::Rect;
pub use state::{FeatureFlags, KeyCommand};
pub use surface::{PixelFormat, SurfaceId, SurfaceLocation};
pub use toolkit::{AlphaMode, FilterMode, RenderMode, RenderToolkit, SoftwareToolkit};
pub use transform::{Camera, Rotation, Viewport};
