//! Generic handlers shared by every resource page.

mod form;
mod list;
mod modals;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    application::{
        admin::resources::ResourceList,
        error::HttpError,
        list_query::{ListQuery, QuerySchema},
        resources::Resource,
    },
    presentation::{admin::views as admin_views, views::render_html},
};

use super::AdminState;

/// Every route of one resource. Form submissions carry files, so they get
/// the upload body limit.
pub(super) fn routes<R: Resource>(upload_limit: usize) -> Router<AdminState> {
    let slug = R::SLUG;
    Router::new()
        .route(&format!("/{slug}"), get(list::resource_index::<R>))
        .route(&format!("/{slug}/panel"), post(list::resource_panel::<R>))
        .route(&format!("/{slug}/new"), get(form::resource_new::<R>))
        .route(
            &format!("/{slug}/create"),
            post(form::resource_create::<R>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/{{id}}/edit"),
            get(form::resource_edit::<R>)
                .post(form::resource_update::<R>)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/form/rows"),
            post(form::resource_rows_new::<R>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/{{id}}/form/rows"),
            post(form::resource_rows_edit::<R>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/form/preview"),
            post(form::resource_preview_new::<R>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/{{id}}/form/preview"),
            post(form::resource_preview_edit::<R>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("/{slug}/{{id}}/delete"),
            post(list::resource_delete::<R>),
        )
        .route(
            &format!("/{slug}/{{id}}/status"),
            get(modals::resource_status_modal::<R>).post(modals::resource_status_update::<R>),
        )
        .route(
            &format!("/{slug}/{{id}}/detail"),
            get(modals::resource_detail::<R>),
        )
}

/// Address-bar form of a list state; the defaults collapse to the bare path.
pub(super) fn list_location(schema: &QuerySchema, query: &ListQuery) -> String {
    if schema.is_default(query) {
        schema.path().to_string()
    } else {
        schema.href(query)
    }
}

fn render_list_panel<R: Resource>(
    state: &AdminState,
    list: &ResourceList<R>,
    source: &'static str,
) -> Result<String, HttpError> {
    let content = state.resources.list_view(list);
    render_html(&admin_views::ResourcePanelTemplate { content }, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::resources::BarangResource;

    #[test]
    fn default_state_collapses_to_the_bare_path() {
        let schema = BarangResource::schema();
        let defaults = schema.defaults();
        assert_eq!(list_location(schema, &defaults), "/barang");

        let searched = defaults.with_search("kursi");
        assert!(list_location(schema, &searched).starts_with("/barang?search=kursi"));
    }
}
