//! # Witty Core
//!
//! Property synchronisation between in-process objects and a remote
//! key-value table.
//!
//! ## Architecture
//!
//! ```text
//! witty-core/src/
//! ├── property/     # PropertyTable: typed getters/setters per key
//! ├── registrant.rs # Registrant trait (populate a table)
//! ├── builder.rs    # PropertyBuilder: publish + arm listeners once per path
//! ├── registry.rs   # one builder per top-level key
//! ├── dashboard/    # Dashboard: start/stop, publish loop, put/get
//! ├── store/        # RemoteStore trait, TopicStore, HTTP TopicServer
//! ├── sendables/    # servo, motor, command, field, alerts, op mode registrants
//! └── modules/      # config file + env overrides
//! ```

#![allow(
    clippy::significant_drop_tightening,
    reason = "parking_lot guards are scoped explicitly around short critical sections"
)]
#![allow(
    clippy::derive_partial_eq_without_eq,
    reason = "Value carries floats and intentionally doesn't implement Eq"
)]
#![allow(clippy::module_name_repetitions, reason = "PropertyTable and friends read better fully named")]
// Test-only lints: allow panic!, float comparisons, etc. in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::float_cmp,
        clippy::needless_collect,
        clippy::assertions_on_result_states
    )
)]

pub mod builder;
pub mod dashboard;
pub mod error;
pub mod modules;
pub mod property;
pub mod registrant;
pub mod registry;
pub mod sendables;
pub mod store;

// Re-export commonly used types
pub use builder::{PropertyBuilder, PublishReport};
pub use dashboard::{Dashboard, DashboardValue};
pub use error::{DashboardError, DashboardResult};
pub use property::{PropertyTable, TypedProperty};
pub use registrant::{from_fn, Registrant};
pub use registry::Registry;
pub use store::{MemoryConnector, RemoteStore, StoreConnector, TopicEvents, TopicServer, TopicStore};
