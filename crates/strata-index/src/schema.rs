//! Tantivy schema for access-aware content documents.
//!
//! # Schema Fields
//!
//! | Field | Options | Purpose |
//! |-------|---------|---------|
//! | `id` | STRING \| STORED | Document identifier (`content:12`, `category:3`) |
//! | `kind` | STRING \| STORED | `content` or `category` |
//! | `key` | STORED | Numeric entity key |
//! | `category` | STRING \| STORED | Owning category key |
//! | `title` | TEXT \| STORED | Display title |
//! | `read_group` | STRING | One value per group with read access |
//! | `browse_group` | STRING | One value per group with admin-browse access |
//!
//! Access fields hold the category ACL as of the last re-index, which is why
//! an ACL change must re-index every content item under the category.

use tantivy::schema::{Field, STORED, STRING, Schema, SchemaBuilder, TEXT};

/// Document kind value for content items.
pub const KIND_CONTENT: &str = "content";

/// Document kind value for categories.
pub const KIND_CATEGORY: &str = "category";

/// Schema holding typed field handles.
#[derive(Clone)]
pub struct IndexSchema {
    schema: Schema,

    /// Document identifier.
    pub id: Field,
    /// Entity kind.
    pub kind: Field,
    /// Entity key.
    pub key: Field,
    /// Owning category.
    pub category: Field,
    /// Display title.
    pub title: Field,
    /// Groups with read access.
    pub read_group: Field,
    /// Groups with admin-browse access.
    pub browse_group: Field,
}

impl IndexSchema {
    /// Build the schema.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let id = builder.add_text_field("id", STRING | STORED);
        let kind = builder.add_text_field("kind", STRING | STORED);
        let key = builder.add_text_field("key", STORED);
        let category = builder.add_text_field("category", STRING | STORED);
        let title = builder.add_text_field("title", TEXT | STORED);
        let read_group = builder.add_text_field("read_group", STRING);
        let browse_group = builder.add_text_field("browse_group", STRING);

        Self {
            schema: builder.build(),
            id,
            kind,
            key,
            category,
            title,
            read_group,
            browse_group,
        }
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
