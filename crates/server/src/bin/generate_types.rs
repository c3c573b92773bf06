use ts_rs::TS;

fn main() {
    let decls = [
        db::models::product::Product::decl(),
        db::models::product::CreateProduct::decl(),
        db::models::product::UpdateProduct::decl(),
        db::models::category::Category::decl(),
        db::models::category::CreateCategory::decl(),
        db::models::category::UpdateCategory::decl(),
        services::services::catalog_query::CatalogPage::decl(),
        services::services::catalog::ProductDetail::decl(),
        services::services::catalog::CatalogStats::decl(),
        services::services::catalog::CategoryCount::decl(),
        services::services::catalog::Resynced::<()>::decl(),
        services::services::admin_auth::AdminLoginRequest::decl(),
        services::services::admin_auth::AdminSessionToken::decl(),
        services::services::image_store::UploadedImage::decl(),
        services::services::order_link::OrderLink::decl(),
        server::routes::products::UpdateProductRequest::decl(),
        server::routes::categories::UpdateCategoryRequest::decl(),
        utils::response::ApiResponse::<(), ()>::decl(),
    ];

    let mut out = String::from("// Generated by `cargo run --bin generate_types`. Do not edit.\n\n");
    for decl in decls {
        out.push_str("export ");
        out.push_str(&decl);
        out.push_str("\n\n");
    }
    print!("{out}");
}
