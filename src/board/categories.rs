//! Category registry and the color assignment policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use super::types::{clean_text, Category, CategoryColor, CategoryId, ValidationError};

/// Pick a color for a new category.
///
/// Chooses uniformly among palette colors not in `used`. Once all eight are
/// taken, chooses uniformly among the whole palette, so collisions are
/// possible past eight categories.
pub fn pick_color<R: Rng + ?Sized>(used: &HashSet<CategoryColor>, rng: &mut R) -> CategoryColor {
    let available: Vec<CategoryColor> = CategoryColor::PALETTE
        .into_iter()
        .filter(|c| !used.contains(c))
        .collect();

    if available.is_empty() {
        CategoryColor::PALETTE[rng.gen_range(0..CategoryColor::PALETTE.len())]
    } else {
        available[rng.gen_range(0..available.len())]
    }
}

/// In-memory list of categories, in insertion order.
pub struct CategoryRegistry {
    categories: Vec<Category>,
    rng: StdRng,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::with_rng(Vec::new(), StdRng::from_entropy())
    }

    /// Build from loaded categories with a caller-supplied random source.
    pub fn with_rng(categories: Vec<Category>, rng: StdRng) -> Self {
        Self { categories, rng }
    }

    /// Colors currently assigned to at least one category.
    pub fn used_colors(&self) -> HashSet<CategoryColor> {
        self.categories.iter().map(|c| c.color).collect()
    }

    /// Draw the color the next added category would get.
    ///
    /// The category form shows this before saving and then passes it to
    /// [`CategoryRegistry::add_with_color`].
    pub fn next_color(&mut self) -> CategoryColor {
        let used = self.used_colors();
        pick_color(&used, &mut self.rng)
    }

    /// Add a category, assigning its color by policy.
    pub fn add(&mut self, name: &str) -> Result<Category, ValidationError> {
        // Validate before drawing so a rejected name leaves the RNG untouched.
        let name = Self::validate_name(name)?;
        let color = self.next_color();
        Ok(self.push(name, color))
    }

    /// Add a category with a color drawn earlier via [`CategoryRegistry::next_color`].
    pub fn add_with_color(
        &mut self,
        name: &str,
        color: CategoryColor,
    ) -> Result<Category, ValidationError> {
        let name = Self::validate_name(name)?;
        Ok(self.push(name, color))
    }

    /// Remove a category. Returns the removed record, or `None` if absent.
    ///
    /// Tasks are not touched here; `Board::delete_category` owns the cascade.
    pub(crate) fn delete(&mut self, id: &CategoryId) -> Option<Category> {
        let idx = self.categories.iter().position(|c| &c.id == id)?;
        Some(self.categories.remove(idx))
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.get(id).is_some()
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn validate_name(name: &str) -> Result<String, ValidationError> {
        let name = clean_text(name);
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(name)
    }

    fn push(&mut self, name: String, color: CategoryColor) -> Category {
        let category = Category {
            id: CategoryId::generate(),
            name,
            color,
        };
        tracing::debug!(category_id = %category.id, color = category.color.hex(), "Category added");
        self.categories.push(category.clone());
        category
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
