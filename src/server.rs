use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{BlogError, Result};
use crate::forms::{CommentForm, EmailPostForm, SearchForm, ShareRequest};
use crate::mailer::{Mailer, OutgoingMail, SmtpMailer};
use crate::models::{Post, Tag};
use crate::paginator::{Page, Paginator};
use crate::query_string::{PageParam, QueryString};
use crate::store::pg_store::PgStore;
use crate::store::queries::SearchQuery;
use crate::store::BlogStore;
use crate::view::comment_renderer::{CommentOutcome, CommentRenderer};
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::search_renderer::{SearchRenderer, SearchState};
use crate::view::share_renderer::{ShareRenderer, ShareState};
use crate::view::sitemap_renderer::Sitemap;
use crate::view::Sidebar;

const HTML: &str = "text/html; charset=utf-8";

/// Template sources, read once when the server starts.
pub struct Templates {
    pub list: String,
    pub detail: String,
    pub comment: String,
    pub share: String,
    pub search: String,
}

impl Templates {
    pub fn load(template_dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            let path = template_dir.join(name);
            debug!("Loading template {}", path.display());
            Ok(fs::read_to_string(path)?)
        };

        Ok(Templates {
            list: read("list.tpl")?,
            detail: read("detail.tpl")?,
            comment: read("comment.tpl")?,
            share: read("share.tpl")?,
            search: read("search.tpl")?,
        })
    }
}

pub struct AppState {
    pub config: Config,
    pub templates: Templates,
    pub store: Arc<dyn BlogStore>,
    pub mailer: Arc<dyn Mailer>,
}

type State = web::types::State<Arc<AppState>>;

fn html_response(rendered: Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(body) => web::HttpResponse::Ok()
            .content_type(HTML)
            .body(body),
        Err(e) => error_response(e),
    }
}

fn xml_response(rendered: Result<Vec<u8>>, content_type: &str) -> web::HttpResponse {
    match rendered {
        Ok(body) => web::HttpResponse::Ok()
            .content_type(content_type)
            .body(body),
        Err(e) => error_response(e),
    }
}

fn error_response(e: BlogError) -> web::HttpResponse {
    match e {
        BlogError::NotFound(what) => {
            debug!("Not found: {}", what);
            web::HttpResponse::NotFound()
                .content_type(HTML)
                .body(format!("{} not found", what))
        }
        e => {
            error!("Error handling request: {}", e);
            web::HttpResponse::InternalServerError()
                .content_type(HTML)
                .body("Internal server error")
        }
    }
}

fn page_param(req: &HttpRequest) -> PageParam {
    match req.uri().query() {
        Some(query_str) => QueryString::from(query_str).get_page(),
        None => PageParam::Missing,
    }
}

fn first_page(limit: i64) -> Page {
    Page { number: 1, limit, offset: 0 }
}

async fn gather_sidebar(state: &AppState) -> Result<Sidebar> {
    let count = state.config.defaults.sidebar_post_count;
    let total = state.store.count_published(None).await?;
    let latest = state.store.list_published(None, &first_page(count)).await?;
    let most_commented = state.store.most_commented(count).await?;
    Ok(Sidebar::new(total, &latest, &most_commented))
}

async fn published_by_id(state: &AppState, post_id: &str) -> Result<Post> {
    let id = post_id.parse::<i64>()
        .map_err(|_| BlogError::NotFound(format!("Post {}", post_id)))?;
    state.store.find_published_by_id(id).await?
        .ok_or_else(|| BlogError::NotFound(format!("Post {}", id)))
}

#[web::get("/")]
async fn index() -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", "/blog/")
        .content_type(HTML)
        .finish()
}

async fn render_list(state: &AppState, tag: Option<&Tag>, param: &PageParam) -> Result<String> {
    let count = state.store.count_published(tag).await?;
    let paginator = Paginator::new(count, state.config.defaults.page_size);
    let page = paginator.resolve(param);
    let posts = state.store.list_published(tag, &page).await?;
    let sidebar = gather_sidebar(state).await?;

    let renderer = ListRenderer::new(&state.templates.list)?;
    renderer.render(&state.config.site.title, &posts, tag, &paginator, &page, &sidebar)
}

#[web::get("/")]
async fn post_list(req: HttpRequest, state: State) -> web::HttpResponse {
    html_response(render_list(&state, None, &page_param(&req)).await)
}

async fn render_tag_list(state: &AppState, tag_slug: &str, param: &PageParam) -> Result<String> {
    let tag = state.store.find_tag(tag_slug).await?
        .ok_or_else(|| BlogError::NotFound(format!("Tag {}", tag_slug)))?;
    render_list(state, Some(&tag), param).await
}

#[web::get("/tag/{tag_slug}/")]
async fn post_list_by_tag(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    let tag_slug = path.into_inner();
    html_response(render_tag_list(&state, &tag_slug, &page_param(&req)).await)
}

fn parse_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

async fn render_detail(state: &AppState, date: Option<NaiveDate>, slug: &str) -> Result<String> {
    let not_found = || BlogError::NotFound(format!("Post {}", slug));
    let date = date.ok_or_else(not_found)?;
    let post = state.store.find_published(date, slug).await?
        .ok_or_else(not_found)?;

    let comments = state.store.active_comments(post.id).await?;
    let similar = state.store.similar_posts(post.id, state.config.defaults.similar_post_count).await?;
    let sidebar = gather_sidebar(state).await?;

    let renderer = PostRenderer::new(&state.templates.detail)?;
    renderer.render(&state.config.site.title, &post, &comments, &similar, &sidebar)
}

#[web::get("/{year}/{month}/{day}/{slug}/")]
async fn post_detail(path: web::types::Path<(String, String, String, String)>, state: State) -> web::HttpResponse {
    let (year, month, day, slug) = path.into_inner();
    let date = parse_date(&year, &month, &day);
    html_response(render_detail(&state, date, &slug).await)
}

async fn render_comment(state: &AppState, post_id: &str, form: &CommentForm) -> Result<String> {
    let post = published_by_id(state, post_id).await?;
    let sidebar = gather_sidebar(state).await?;
    let renderer = CommentRenderer::new(&state.templates.comment)?;

    match form.clean() {
        Ok(new_comment) => {
            let comment = state.store.add_comment(post.id, new_comment).await?;
            info!("Comment {} added to post {}", comment.id, post.id);
            renderer.render(&state.config.site.title, &post, &CommentOutcome::Added(&comment), &sidebar)
        }
        Err(errors) => {
            debug!("Rejected comment for post {}", post.id);
            renderer.render(&state.config.site.title, &post, &CommentOutcome::Rejected(form, &errors), &sidebar)
        }
    }
}

#[web::post("/{post_id}/comment/")]
async fn post_comment(path: web::types::Path<String>, form: web::types::Form<CommentForm>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    html_response(render_comment(&state, &post_id, &form.into_inner()).await)
}

fn share_mail(post: &Post, base_url: &str, request: ShareRequest) -> OutgoingMail {
    let post_url = post.absolute_url(base_url);
    OutgoingMail {
        to: request.to,
        subject: format!("{} ({}) recommends you read {}", request.name, request.email, post.title),
        body: format!("Read {} at {}\n\n{}'s comments: {}", post.title, post_url, request.name, request.comments),
    }
}

async fn render_share(state: &AppState, post_id: &str, form: Option<&EmailPostForm>) -> Result<String> {
    let post = published_by_id(state, post_id).await?;
    let sidebar = gather_sidebar(state).await?;
    let renderer = ShareRenderer::new(&state.templates.share)?;
    let site_title = &state.config.site.title;

    let Some(form) = form else {
        return renderer.render(site_title, &post, &ShareState::Empty, &sidebar);
    };

    let request = match form.clean() {
        Ok(request) => request,
        Err(errors) => {
            return renderer.render(site_title, &post, &ShareState::Invalid(form, &errors), &sidebar);
        }
    };

    let mail = share_mail(&post, &state.config.site.base_url, request);
    match state.mailer.send(mail).await {
        Ok(()) => renderer.render(site_title, &post, &ShareState::Sent(form), &sidebar),
        Err(e) => {
            warn!("Failed to share post {}: {}", post.id, e);
            renderer.render(site_title, &post, &ShareState::MailFailed(form), &sidebar)
        }
    }
}

#[web::get("/{post_id}/share/")]
async fn share_form(path: web::types::Path<String>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    html_response(render_share(&state, &post_id, None).await)
}

#[web::post("/{post_id}/share/")]
async fn share_post(path: web::types::Path<String>, form: web::types::Form<EmailPostForm>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    html_response(render_share(&state, &post_id, Some(&form.into_inner())).await)
}

async fn render_search(state: &AppState, query: Option<&str>) -> Result<String> {
    let sidebar = gather_sidebar(state).await?;
    let renderer = SearchRenderer::new(&state.templates.search)?;
    let site_title = &state.config.site.title;

    let Some(query) = query else {
        return renderer.render(site_title, &SearchState::Empty, &sidebar);
    };

    let form = SearchForm { query: Some(query.to_string()) };
    match form.clean() {
        Ok(text) => {
            let search = &state.config.search;
            let search_query = SearchQuery::new(&text)
                .with_text_config(&search.text_config)
                .with_thresholds(search.rank_threshold, search.similarity_threshold);
            let results = state.store.search(&search_query).await?;
            debug!("Search '{}' found {} posts", text, results.len());
            renderer.render(site_title, &SearchState::Results(&text, &results), &sidebar)
        }
        Err(errors) => renderer.render(site_title, &SearchState::Invalid(query, &errors), &sidebar),
    }
}

#[web::get("/search/")]
async fn post_search(req: HttpRequest, state: State) -> web::HttpResponse {
    let qs = QueryString::from(req.uri().query().unwrap_or(""));
    html_response(render_search(&state, qs.get("query")).await)
}

async fn render_feed(state: &AppState) -> Result<Vec<u8>> {
    let feed = &state.config.rss_feed;
    let posts = state.store.list_published(None, &first_page(feed.item_count)).await?;
    let rss = RssChannel {
        ch_title: &feed.title,
        base_url: &state.config.site.base_url,
        ch_desc: &feed.description,
        summary_word_count: feed.summary_word_count,
    };
    rss.render(&posts)
}

#[web::get("/feed/")]
async fn post_feed(state: State) -> web::HttpResponse {
    xml_response(render_feed(&state).await, "application/rss+xml; charset=utf-8")
}

async fn render_sitemap(state: &AppState) -> Result<Vec<u8>> {
    let posts = state.store.all_published().await?;
    Sitemap { base_url: &state.config.site.base_url }.render(&posts)
}

#[web::get("/sitemap.xml")]
async fn sitemap(state: State) -> web::HttpResponse {
    xml_response(render_sitemap(&state).await, "application/xml; charset=utf-8")
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: State) -> std::result::Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

/// Every route of the site. The blog itself lives under `/blog`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(sitemap)
        .service(public_files)
        .service(web::scope("/blog")
            .service(post_list)
            .service(post_search)
            .service(post_feed)
            .service(post_list_by_tag)
            .service(post_comment)
            .service(share_form)
            .service(share_post)
            .service(post_detail));
}

pub async fn server_run(config: Config) -> Result<()> {
    let templates = Templates::load(&config.paths.template_dir)?;

    let store = PgStore::connect(&config.database).await?;
    if config.database.run_migrations {
        store.migrate().await?;
    }
    let mailer = SmtpMailer::new(config.mail.as_ref())?;

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    info!("Starting server on {}:{}", bind_addr, bind_port);

    let app_state = Arc::new(AppState {
        config,
        templates,
        store: Arc::new(store),
        mailer: Arc::new(mailer),
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(routes)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await?;

    Ok(())
}
