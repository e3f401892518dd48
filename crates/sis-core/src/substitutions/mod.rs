//! Substitution reconciliation.
//!
//! For one calendar date this module answers three questions:
//!
//! 1. Which groups does each affected educator normally teach? (`before`)
//! 2. Which groups does each affected educator teach once the
//!    substitutions apply? (`after`)
//! 3. Which groups or parts go home? (`released`)
//!
//! ## Usage
//! ```rust,ignore
//! use sis_core::substitutions::Reconciler;
//!
//! let table = Reconciler::new(&db).with_schedules(&versions).table_for(date)?;
//! for (educator, orders) in table.after.iter() {
//!     println!("{educator}: {orders:?}");
//! }
//! ```

mod reconcile;
mod table;

pub use reconcile::{opposite_part_is_covered, reconcile_substitutions, Reconciler, SubstitutionTable};
pub use table::{EntryTable, GroupPart, ReleasedTable};
