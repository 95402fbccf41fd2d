//! Repositories - the consumer-facing binding over entity stores.
//!
//! A [`RepoContext`] owns the store and factory registries for one
//! application and is passed to whoever needs a [`Repo`].
//!
//! ## Example
//!
//! ```ignore
//! let ctx = RepoContext::builder()
//!     .persistence(FilePersistence::open(".data")?)
//!     .source(FileSnapshotSource::new("public"))
//!     .build();
//!
//! ctx.factories().register("users", || User::fake());
//!
//! let (users, hydration) = ctx.mount::<User>().await?;
//! if users.is_empty() {
//!     users.populate(10, false)?;
//! }
//! ```

mod context;
mod item;
mod repo;

pub use context::{RepoContext, RepoContextBuilder};
pub use item::ItemRepo;
pub use repo::{Hydration, Repo};
