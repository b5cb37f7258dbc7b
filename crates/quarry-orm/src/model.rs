//! The model descriptor trait.

/// Describes how one entity type maps onto a table.
///
/// A model is a zero-sized descriptor; row state lives in
/// [`Record<M>`](crate::Record). The associated items default to the common
/// case, so a minimal model is just a table name:
///
/// ```rust
/// use quarry_orm::Model;
///
/// struct User;
///
/// impl Model for User {
///     const TABLE: &'static str = "users";
/// }
/// ```
///
/// Opting into soft deletes and a fillable whitelist:
///
/// ```rust
/// use quarry_orm::Model;
///
/// struct Post;
///
/// impl Model for Post {
///     const TABLE: &'static str = "posts";
///     const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
///
///     fn fillable() -> &'static [&'static str] {
///         &["title", "body"]
///     }
/// }
/// ```
pub trait Model: 'static {
    /// The table this model maps to.
    const TABLE: &'static str;

    /// The primary key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Whether inserts and updates maintain `created_at` / `updated_at`.
    const TIMESTAMPS: bool = true;

    /// The soft-delete column, when deletes should mark instead of remove.
    const SOFT_DELETE: Option<&'static str> = None;

    /// Mass-assignment whitelist for [`fill`](crate::Record::fill).
    /// An empty slice means every attribute is fillable.
    fn fillable() -> &'static [&'static str] {
        &[]
    }
}
