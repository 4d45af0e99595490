//! Search fields and sort keys for each collection.

use super::{Queryable, SortValue};
use crate::domain::{
    FixedExpense, FuturesTrade, ProjectCost, ProjectName, SpotTrade, Status, Task,
};
use crate::engine::TradeWithMetrics;

impl Queryable for FuturesTrade {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.symbol.as_str(), self.notes.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        let exit = self.exit();
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "symbol" => SortValue::text(self.symbol.as_str()),
            "direction" => SortValue::text(self.direction.as_str()),
            "leverage" => SortValue::number(self.leverage.as_decimal()),
            "entryDate" => SortValue::date(self.entry_date),
            "entryPrice" => SortValue::number(self.entry_price),
            "quantity" => SortValue::number(self.quantity),
            "entryFees" => SortValue::number(self.entry_fees),
            "status" => SortValue::text(self.status.label()),
            "exitDate" => SortValue::opt_date(exit.map(|e| e.date)),
            "exitPrice" => SortValue::opt_number(exit.map(|e| e.price)),
            "exitFees" => SortValue::opt_number(exit.map(|e| e.fees)),
            "pnl" => SortValue::number(self.realized_pnl()),
            "notes" => SortValue::text(self.notes.as_str()),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for TradeWithMetrics {
    fn search_fields(&self) -> Vec<&str> {
        self.trade.search_fields()
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "margin" => SortValue::number(self.margin),
            "roi" => SortValue::number(self.roi),
            _ => self.trade.sort_value(key),
        }
    }
}

impl Queryable for SpotTrade {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.base_asset.as_str(),
            self.quote_asset.as_str(),
            self.notes.as_str(),
        ]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "tradeDate" => SortValue::date(self.trade_date),
            "type" => SortValue::text(self.side.as_str()),
            "baseAsset" => SortValue::text(self.base_asset.as_str()),
            "quoteAsset" => SortValue::text(self.quote_asset.as_str()),
            "price" => SortValue::number(self.price),
            "quantityBase" => SortValue::number(self.quantity_base),
            "fees" => SortValue::number(self.fees),
            "totalQuote" => SortValue::number(self.total_quote()),
            "notes" => SortValue::text(self.notes.as_str()),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for Task {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.project_name.as_deref());
        fields
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "name" => SortValue::text(self.name.as_str()),
            "description" => SortValue::opt_text(self.description.as_deref()),
            "projectName" => SortValue::opt_text(self.project_name.as_deref()),
            "status" => SortValue::opt_text(self.status.as_deref()),
            "startDate" => SortValue::opt_date(self.start_date),
            "dueDate" => SortValue::opt_date(self.due_date),
            "completed" => self
                .completed
                .map(SortValue::Bool)
                .unwrap_or(SortValue::Null),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for ProjectCost {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.project_name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "projectName" => SortValue::text(self.project_name.as_str()),
            "description" => SortValue::opt_text(self.description.as_deref()),
            "budget" => SortValue::opt_number(self.budget),
            "actual" => SortValue::opt_number(self.actual),
            "variance" => SortValue::opt_number(self.variance()),
            "date" => SortValue::opt_date(self.date),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for FixedExpense {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "name" => SortValue::text(self.name.as_str()),
            "amount" => SortValue::opt_number(self.amount),
            "category" => SortValue::opt_text(self.category.as_deref()),
            "frequency" => SortValue::opt_text(self.frequency.as_deref()),
            "dueDate" => SortValue::opt_date(self.due_date),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for Status {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "name" => SortValue::text(self.name.as_str()),
            "color" => SortValue::opt_text(self.color.as_deref()),
            _ => SortValue::Null,
        }
    }
}

impl Queryable for ProjectName {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue<'_> {
        match key {
            "id" => SortValue::text(self.id.as_str()),
            "name" => SortValue::text(self.name.as_str()),
            "color" => SortValue::opt_text(self.color.as_deref()),
            _ => SortValue::Null,
        }
    }
}
