// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Declared line items.
//!
//! `ItemList` stores its first item separately from the rest, so an empty
//! list cannot be constructed. Removal of the last item is refused.

use crate::error::DomainError;
use crate::types::{CatalogProduct, SourceDeclaration};
use serde::{Deserialize, Serialize};

/// Identifier of a line item, unique within one `ItemList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(u32);

impl LineItemId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item data as recorded on a source declaration or a fetched detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceItem {
    pub product_name: String,
    pub hsn_code: String,
    pub rm_id: Option<String>,
    pub quantity: String,
    pub unit: String,
    pub sku_code: Option<String>,
    pub outbound_batch_id: Option<String>,
}

/// One declared line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Identifier within the owning list.
    pub id: LineItemId,
    /// Product name, free text or taken from the catalogue.
    pub product_name: String,
    /// Harmonized System code.
    pub hsn_code: String,
    /// Raw material identifier.
    pub rm_id: Option<String>,
    /// Quantity as entered; parsed only when validated.
    pub quantity: String,
    /// Unit of measure.
    pub unit: String,
    /// Stock keeping unit code.
    pub sku_code: Option<String>,
    /// Batch identifier of the outbound shipment.
    pub outbound_batch_id: Option<String>,
    /// Set once the product was chosen from the catalogue; the HSN code is then read-only.
    pub is_product_locked: bool,
}

impl LineItem {
    /// Creates an empty, unlocked line item.
    #[must_use]
    pub const fn empty(id: LineItemId) -> Self {
        Self {
            id,
            product_name: String::new(),
            hsn_code: String::new(),
            rm_id: None,
            quantity: String::new(),
            unit: String::new(),
            sku_code: None,
            outbound_batch_id: None,
            is_product_locked: false,
        }
    }

    /// Creates a line item from recorded item data.
    ///
    /// Items seeded from a record carry a canonical product, so they are
    /// locked whenever a product name is present.
    #[must_use]
    pub fn from_source(id: LineItemId, source: &SourceItem) -> Self {
        Self {
            id,
            product_name: source.product_name.clone(),
            hsn_code: source.hsn_code.clone(),
            rm_id: source.rm_id.clone(),
            quantity: source.quantity.clone(),
            unit: source.unit.clone(),
            sku_code: source.sku_code.clone(),
            outbound_batch_id: source.outbound_batch_id.clone(),
            is_product_locked: !source.product_name.trim().is_empty(),
        }
    }

    /// Returns true if the product name is non-empty after trimming.
    ///
    /// Only named items survive assembly.
    #[must_use]
    pub fn has_product_name(&self) -> bool {
        !self.product_name.trim().is_empty()
    }

    /// Returns true if name, HSN code and a positive quantity are all present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_product_name()
            && !self.hsn_code.trim().is_empty()
            && parse_quantity(&self.quantity).is_some()
    }
}

/// Parses a quantity string, returning it only if it is a finite positive number.
#[must_use]
pub fn parse_quantity(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|quantity| quantity.is_finite() && *quantity > 0.0)
}

/// A partial edit of a line item. `None` leaves a field untouched.
///
/// For optional fields an empty string clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub product_name: Option<String>,
    pub hsn_code: Option<String>,
    pub rm_id: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub sku_code: Option<String>,
    pub outbound_batch_id: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The ordered, never-empty list of declared items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList {
    first: LineItem,
    rest: Vec<LineItem>,
    next_id: u32,
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemList {
    /// Creates a list holding a single empty item.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            first: LineItem::empty(LineItemId(1)),
            rest: Vec::new(),
            next_id: 2,
        }
    }

    /// Builds a list from recorded item data, falling back to a single empty
    /// item when `items` yields nothing.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceItem>,
    {
        let mut list: Self = Self::new();
        let mut seeded: bool = false;
        for source in items {
            if seeded {
                let id: LineItemId = list.allocate_id();
                list.rest.push(LineItem::from_source(id, source));
            } else {
                list.first = LineItem::from_source(list.first.id, source);
                seeded = true;
            }
        }
        list
    }

    /// Builds a list from the items of the selected source declarations, in order.
    #[must_use]
    pub fn from_sources(sources: &[SourceDeclaration]) -> Self {
        Self::from_items(sources.iter().flat_map(|source| source.items.iter()))
    }

    const fn allocate_id(&mut self) -> LineItemId {
        let id: LineItemId = LineItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of items. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Always false; present for API symmetry with slices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The first item.
    #[must_use]
    pub const fn first(&self) -> &LineItem {
        &self.first
    }

    /// Iterates the items in order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: LineItemId) -> Result<&mut LineItem, DomainError> {
        if self.first.id == id {
            return Ok(&mut self.first);
        }
        self.rest
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(DomainError::LineItemNotFound(id))
    }

    /// Appends an empty item and returns its id.
    pub fn add(&mut self) -> LineItemId {
        let id: LineItemId = self.allocate_id();
        self.rest.push(LineItem::empty(id));
        id
    }

    /// Removes an item.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `id` is the only remaining item
    /// - no item has the given id
    pub fn remove(&mut self, id: LineItemId) -> Result<(), DomainError> {
        if self.first.id == id {
            if self.rest.is_empty() {
                return Err(DomainError::LastLineItem);
            }
            self.first = self.rest.remove(0);
            return Ok(());
        }

        let position: usize = self
            .rest
            .iter()
            .position(|item| item.id == id)
            .ok_or(DomainError::LineItemNotFound(id))?;
        self.rest.remove(position);
        Ok(())
    }

    /// Applies a partial edit to an item.
    ///
    /// Changing the product name of a catalogue item turns it back into a free
    /// text item, which unlocks its HSN code.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no item has the given id
    /// - the patch edits the HSN code of a locked item
    pub fn update(&mut self, id: LineItemId, patch: ItemPatch) -> Result<(), DomainError> {
        let item: &mut LineItem = self.get_mut(id)?;

        let unlocks: bool = patch
            .product_name
            .as_ref()
            .is_some_and(|name| *name != item.product_name);
        if item.is_product_locked && !unlocks && patch.hsn_code.is_some() {
            return Err(DomainError::HsnCodeLocked(id));
        }

        if let Some(product_name) = patch.product_name {
            if unlocks {
                item.is_product_locked = false;
            }
            item.product_name = product_name;
        }
        if let Some(hsn_code) = patch.hsn_code {
            item.hsn_code = hsn_code;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = patch.unit {
            item.unit = unit;
        }
        if let Some(rm_id) = patch.rm_id {
            item.rm_id = non_empty(rm_id);
        }
        if let Some(sku_code) = patch.sku_code {
            item.sku_code = non_empty(sku_code);
        }
        if let Some(outbound_batch_id) = patch.outbound_batch_id {
            item.outbound_batch_id = non_empty(outbound_batch_id);
        }
        Ok(())
    }

    /// Sets an item's product from the catalogue and locks its HSN code.
    ///
    /// # Errors
    ///
    /// Returns an error if no item has the given id.
    pub fn choose_product(
        &mut self,
        id: LineItemId,
        product: CatalogProduct,
    ) -> Result<(), DomainError> {
        let item: &mut LineItem = self.get_mut(id)?;
        item.product_name = product.product_name;
        item.hsn_code = product.hsn_code;
        if product.rm_id.is_some() {
            item.rm_id = product.rm_id;
        }
        item.is_product_locked = true;
        Ok(())
    }
}
