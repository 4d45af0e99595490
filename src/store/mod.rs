//! In-memory snapshot of every collection, with an explicit update contract.
//!
//! Compute functions only borrow the ledger. Every mutation goes through a
//! method returning `Result`, and the caller is responsible for writing the
//! changed document back to the repository.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::domain::{
    Decimal, FixedExpense, FuturesTrade, ProjectCost, ProjectName, RecordError, RecordId,
    SpotTrade, SpotTradeUpdate, Status, Task, TimeMs,
};
use crate::engine::{close_futures_position, CloseRejected};

/// Named collections, as used in routes and in the document table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    FuturesTrades,
    SpotTrades,
    Tasks,
    ProjectCosts,
    FixedExpenses,
    Statuses,
    ProjectNames,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::FuturesTrades,
        Collection::SpotTrades,
        Collection::Tasks,
        Collection::ProjectCosts,
        Collection::FixedExpenses,
        Collection::Statuses,
        Collection::ProjectNames,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::FuturesTrades => "futures-trades",
            Collection::SpotTrades => "spot-trades",
            Collection::Tasks => "tasks",
            Collection::ProjectCosts => "project-costs",
            Collection::FixedExpenses => "fixed-expenses",
            Collection::Statuses => "statuses",
            Collection::ProjectNames => "project-names",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{collection} record not found: {id}")]
    NotFound { collection: Collection, id: String },
    #[error("{collection} record already exists: {id}")]
    DuplicateId { collection: Collection, id: String },
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Close(#[from] CloseRejected),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A record type stored in one of the ledger's collections.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &RecordId;

    fn slot(ledger: &Ledger) -> &Vec<Self>;

    fn slot_mut(ledger: &mut Ledger) -> &mut Vec<Self>;

    /// Veto a whole-record replacement. Accepts everything by default.
    fn check_replace(_current: &Self, _next: &Self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The application state snapshot: one ordered list per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub(crate) futures_trades: Vec<FuturesTrade>,
    pub(crate) spot_trades: Vec<SpotTrade>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) project_costs: Vec<ProjectCost>,
    pub(crate) fixed_expenses: Vec<FixedExpense>,
    pub(crate) statuses: Vec<Status>,
    pub(crate) project_names: Vec<ProjectName>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of one collection, in insertion order.
    pub fn all<T: Document>(&self) -> &[T] {
        T::slot(self)
    }

    pub fn get<T: Document>(&self, id: &RecordId) -> Option<&T> {
        T::slot(self).iter().find(|doc| doc.id() == id)
    }

    pub fn futures_trades(&self) -> &[FuturesTrade] {
        &self.futures_trades
    }

    pub fn spot_trades(&self) -> &[SpotTrade] {
        &self.spot_trades
    }

    pub fn len(&self) -> usize {
        self.futures_trades.len()
            + self.spot_trades.len()
            + self.tasks.len()
            + self.project_costs.len()
            + self.fixed_expenses.len()
            + self.statuses.len()
            + self.project_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a new record. Ids are unique per collection.
    pub fn insert<T: Document>(&mut self, doc: T) -> Result<&T, StoreError> {
        if self.get::<T>(doc.id()).is_some() {
            return Err(StoreError::DuplicateId {
                collection: T::COLLECTION,
                id: doc.id().to_string(),
            });
        }
        debug!(collection = %T::COLLECTION, id = %doc.id(), "insert");
        let slot = T::slot_mut(self);
        slot.push(doc);
        Ok(&slot[slot.len() - 1])
    }

    /// Replace a record in place, keeping its position.
    pub fn replace<T: Document>(&mut self, doc: T) -> Result<&T, StoreError> {
        let index = self.position::<T>(doc.id())?;
        T::check_replace(&T::slot(self)[index], &doc)?;
        debug!(collection = %T::COLLECTION, id = %doc.id(), "replace");
        let slot = T::slot_mut(self);
        slot[index] = doc;
        Ok(&slot[index])
    }

    /// Remove a record and hand it back.
    pub fn remove<T: Document>(&mut self, id: &RecordId) -> Result<T, StoreError> {
        let index = self.position::<T>(id)?;
        debug!(collection = %T::COLLECTION, id = %id, "remove");
        Ok(T::slot_mut(self).remove(index))
    }

    /// Close an open futures position and write the result back.
    ///
    /// An already-closed trade is rejected and left untouched.
    pub fn close_futures_trade(
        &mut self,
        id: &RecordId,
        exit_price: Decimal,
        exit_fees: Decimal,
        closed_at: TimeMs,
    ) -> Result<&FuturesTrade, StoreError> {
        let index = self.position::<FuturesTrade>(id)?;
        let closed =
            close_futures_position(&self.futures_trades[index], exit_price, exit_fees, closed_at)?;
        self.futures_trades[index] = closed;
        Ok(&self.futures_trades[index])
    }

    /// Apply a partial edit to a spot trade; totalQuote follows automatically.
    pub fn edit_spot_trade(
        &mut self,
        id: &RecordId,
        update: &SpotTradeUpdate,
    ) -> Result<&SpotTrade, StoreError> {
        let index = self.position::<SpotTrade>(id)?;
        let edited = update.apply(&self.spot_trades[index])?;
        self.spot_trades[index] = edited;
        Ok(&self.spot_trades[index])
    }

    fn position<T: Document>(&self, id: &RecordId) -> Result<usize, StoreError> {
        T::slot(self)
            .iter()
            .position(|doc| doc.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            })
    }
}

macro_rules! document {
    ($ty:ty, $collection:expr, $field:ident) => {
        impl Document for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &RecordId {
                &self.id
            }

            fn slot(ledger: &Ledger) -> &Vec<Self> {
                &ledger.$field
            }

            fn slot_mut(ledger: &mut Ledger) -> &mut Vec<Self> {
                &mut ledger.$field
            }
        }
    };
}

document!(SpotTrade, Collection::SpotTrades, spot_trades);
document!(Task, Collection::Tasks, tasks);
document!(ProjectCost, Collection::ProjectCosts, project_costs);
document!(FixedExpense, Collection::FixedExpenses, fixed_expenses);
document!(Status, Collection::Statuses, statuses);
document!(ProjectName, Collection::ProjectNames, project_names);

impl Document for FuturesTrade {
    const COLLECTION: Collection = Collection::FuturesTrades;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn slot(ledger: &Ledger) -> &Vec<Self> {
        &ledger.futures_trades
    }

    fn slot_mut(ledger: &mut Ledger) -> &mut Vec<Self> {
        &mut ledger.futures_trades
    }

    /// A closed position can never become open again.
    fn check_replace(current: &Self, next: &Self) -> Result<(), StoreError> {
        if current.is_closed() && next.is_open() {
            return Err(StoreError::InvalidTransition(format!(
                "futures trade {} is closed and cannot be reopened",
                current.id
            )));
        }
        Ok(())
    }
}
