//! Catalog access and verification facade.
//!
//! Composes the catalog and account stores, the pure resolvers, and the
//! [`VerificationGate`]. Holds no per-request state: the caller context and
//! the catalog snapshot are read for every call.

use std::collections::HashSet;
use std::sync::Arc;

use agrocat_accounts::CallerContext;
use agrocat_catalog::{
    CatalogFilterEngine, CurrencyProjection, DisplayPrice, FilterSpec, PriceQuote,
    PriceVisibilityResolver, Product, SearchLimits, SpecificationIndex, SpecificationLine,
    active_categories, category_tree, featured_brands, search,
};
use agrocat_core::{DomainError, Language, LanguageResolver, ProductId};
use agrocat_infra::{
    AccountStore, CatalogSnapshot, CatalogStore, EngineConfig, RateDecision, RateLimitPolicy,
    RateScope, RegistryLookup, VerificationGate, VerificationOutcome,
};

use crate::error::EngineError;
use crate::request::RequestContext;
use crate::views::{
    BrandView, CatalogPage, CategoryTreeView, CategoryView, ProductDetailView, ProductView, SearchResults,
    ViewContext,
};

pub const FEATURED_LIMIT: usize = 12;
pub const RELATED_LIMIT: usize = 6;
pub const COMPARE_LIMIT: usize = 4;

/// Per-call inputs resolved once at the start of every operation.
struct Resolved {
    caller: CallerContext,
    lang: Language,
    snapshot: Arc<CatalogSnapshot>,
}

impl Resolved {
    fn product_by_slug(&self, slug: &str) -> Result<&Product, EngineError> {
        self.snapshot
            .product_by_slug(slug)
            .ok_or_else(|| DomainError::not_found(format!("product '{slug}'")).into())
    }
}

#[derive(Debug)]
pub struct CatalogEngine<C, A, R> {
    catalog: C,
    gate: VerificationGate<A, R>,
    projection: CurrencyProjection,
    rate_limits: RateLimitPolicy,
    search_limits: SearchLimits,
}

impl<C, A, R> CatalogEngine<C, A, R>
where
    C: CatalogStore,
    A: AccountStore,
    R: RegistryLookup,
{
    /// Build the engine. `make_registry` is only invoked when `config` names
    /// the development environment.
    pub fn new<F>(
        config: &EngineConfig,
        catalog: C,
        accounts: A,
        make_registry: F,
    ) -> Result<Self, EngineError>
    where
        F: FnOnce() -> R,
    {
        Ok(Self {
            catalog,
            gate: VerificationGate::for_environment(config.environment, accounts, make_registry),
            projection: config.currency_projection()?,
            rate_limits: config.rate_limits,
            search_limits: SearchLimits::default(),
        })
    }

    pub fn verification_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Rate-limit decision for the transport.
    pub fn rate_limit(&self, scope: RateScope, requests_in_window: u32) -> RateDecision {
        self.rate_limits.decide(scope, requests_in_window)
    }

    fn accounts(&self) -> &A {
        self.gate.store()
    }

    fn resolve(&self, request: &RequestContext) -> Result<Resolved, EngineError> {
        let caller = self.accounts().caller_context(request.account_id)?;
        let lang = LanguageResolver::resolve_with_preference(
            request.language_hint.as_deref(),
            caller.preferred_language(),
        );
        let snapshot = self.catalog.snapshot()?;
        Ok(Resolved {
            caller,
            lang,
            snapshot,
        })
    }

    fn view_context<'a>(&'a self, resolved: &'a Resolved) -> ViewContext<'a> {
        ViewContext {
            lang: resolved.lang,
            projection: &self.projection,
            categories: &resolved.snapshot.categories,
            brands: &resolved.snapshot.brands,
        }
    }

    fn list_views<'p>(
        &self,
        resolved: &Resolved,
        products: impl IntoIterator<Item = &'p Product>,
    ) -> Vec<ProductView> {
        let ctx = self.view_context(resolved);
        products
            .into_iter()
            .map(|p| {
                let quote = PriceVisibilityResolver::resolve(p, &resolved.caller);
                ProductView::new(p, &quote, ctx)
            })
            .collect()
    }

    /// The quote a caller gets for a product (possibly hidden).
    pub fn resolve_price(
        &self,
        request: &RequestContext,
        slug: &str,
    ) -> Result<PriceQuote, EngineError> {
        let resolved = self.resolve(request)?;
        let product = resolved.product_by_slug(slug)?;
        Ok(PriceVisibilityResolver::resolve(product, &resolved.caller))
    }

    /// Visible price in both currencies; `PermissionDenied` when hidden.
    pub fn quote(&self, request: &RequestContext, slug: &str) -> Result<DisplayPrice, EngineError> {
        let quote = self.resolve_price(request, slug)?;
        quote.into_visible()?;
        Ok(self.projection.project(&quote))
    }

    pub fn render_specifications(
        &self,
        request: &RequestContext,
        slug: &str,
    ) -> Result<Vec<SpecificationLine>, EngineError> {
        let resolved = self.resolve(request)?;
        let product = resolved.product_by_slug(slug)?;
        Ok(SpecificationIndex::new(&product.specifications).render(resolved.lang))
    }

    /// Filtered and ordered listing from transport key/value parameters.
    pub fn filter_catalog<I, K, V>(
        &self,
        request: &RequestContext,
        params: I,
    ) -> Result<CatalogPage, EngineError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let spec = FilterSpec::from_params(params)?;
        let resolved = self.resolve(request)?;
        let matched = CatalogFilterEngine::apply(&resolved.snapshot.products, &spec);
        let results = self.list_views(&resolved, matched);
        Ok(CatalogPage {
            count: results.len(),
            results,
        })
    }

    /// Product page; counts a view.
    pub fn product_detail(
        &self,
        request: &RequestContext,
        slug: &str,
    ) -> Result<ProductDetailView, EngineError> {
        let resolved = self.resolve(request)?;
        let product = resolved.product_by_slug(slug)?;
        let view_count = self.catalog.record_view(product.id)?;

        let quote = PriceVisibilityResolver::resolve(product, &resolved.caller);
        let mut view = ProductDetailView::new(product, &quote, self.view_context(&resolved));
        view.view_count = view_count;
        Ok(view)
    }

    /// Featured products, most recent first.
    pub fn featured(&self, request: &RequestContext) -> Result<Vec<ProductView>, EngineError> {
        let resolved = self.resolve(request)?;
        let spec = FilterSpec {
            featured: Some(true),
            ..FilterSpec::default()
        };
        let mut matched = CatalogFilterEngine::apply(&resolved.snapshot.products, &spec);
        matched.truncate(FEATURED_LIMIT);
        Ok(self.list_views(&resolved, matched))
    }

    /// Top-level categories with their children, by display order.
    pub fn categories(&self, request: &RequestContext) -> Result<Vec<CategoryTreeView>, EngineError> {
        let resolved = self.resolve(request)?;
        Ok(category_tree(resolved.snapshot.view())
            .iter()
            .map(|node| CategoryTreeView::new(node, resolved.lang))
            .collect())
    }

    /// Every active category in one list, for filter pickers.
    pub fn categories_flat(&self, request: &RequestContext) -> Result<Vec<CategoryView>, EngineError> {
        let resolved = self.resolve(request)?;
        Ok(active_categories(resolved.snapshot.view())
            .into_iter()
            .map(|c| CategoryView::new(c, resolved.lang))
            .collect())
    }

    pub fn featured_brands(&self, request: &RequestContext) -> Result<Vec<BrandView>, EngineError> {
        let resolved = self.resolve(request)?;
        Ok(featured_brands(resolved.snapshot.view())
            .into_iter()
            .map(BrandView::new)
            .collect())
    }

    /// Other active products in the same category.
    pub fn related(
        &self,
        request: &RequestContext,
        slug: &str,
    ) -> Result<Vec<ProductView>, EngineError> {
        let resolved = self.resolve(request)?;
        let product = resolved.product_by_slug(slug)?;
        let spec = FilterSpec {
            category: Some(product.category.slug.clone()),
            ..FilterSpec::default()
        };
        let related: Vec<&Product> = CatalogFilterEngine::apply(&resolved.snapshot.products, &spec)
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_LIMIT)
            .collect();
        Ok(self.list_views(&resolved, related))
    }

    /// Side-by-side detail views for a comma-separated id list (1 to 4 ids).
    /// Unknown or inactive ids are skipped; duplicates collapse.
    pub fn compare(
        &self,
        request: &RequestContext,
        ids: &str,
    ) -> Result<Vec<ProductDetailView>, EngineError> {
        let ids = parse_compare_ids(ids)?;
        let resolved = self.resolve(request)?;
        let ctx = self.view_context(&resolved);
        Ok(ids
            .iter()
            .filter_map(|id| resolved.snapshot.product(*id))
            .filter(|p| p.is_active)
            .map(|p| {
                let quote = PriceVisibilityResolver::resolve(p, &resolved.caller);
                ProductDetailView::new(p, &quote, ctx)
            })
            .collect())
    }

    pub fn search(&self, request: &RequestContext, query: &str) -> Result<SearchResults, EngineError> {
        let resolved = self.resolve(request)?;
        let hits = search(resolved.snapshot.view(), query, self.search_limits);
        if hits.is_empty() {
            return Ok(SearchResults::empty());
        }
        Ok(SearchResults {
            products: self.list_views(&resolved, hits.products),
            categories: hits
                .categories
                .into_iter()
                .map(|c| CategoryView::new(c, resolved.lang))
                .collect(),
            brands: hits.brands.into_iter().map(BrandView::new).collect(),
        })
    }

    /// Business verification for the authenticated caller.
    ///
    /// Anonymous requests are refused with `PermissionDenied` before the
    /// gate runs, so the gate outcome (including `ServiceUnavailable` in
    /// production) only ever reaches authenticated callers.
    pub fn verify(
        &self,
        request: &RequestContext,
        raw_tax_id: &str,
    ) -> Result<VerificationOutcome, EngineError> {
        let account_id = request
            .account_id
            .ok_or_else(|| DomainError::permission_denied("sign in to verify a business"))?;
        Ok(self.gate.verify(account_id, raw_tax_id)?)
    }
}

fn parse_compare_ids(raw: &str) -> Result<Vec<ProductId>, DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::validation("ids parameter is required"));
    }
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let id: ProductId = part
            .parse()
            .map_err(|_| DomainError::validation(format!("malformed product id '{}'", part.trim())))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    if ids.len() > COMPARE_LIMIT {
        return Err(DomainError::validation(format!(
            "at most {COMPARE_LIMIT} products can be compared"
        )));
    }
    Ok(ids)
}
