use std::cell::Cell;
use std::rc::Rc;

use gloo_net::http::Request;
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Event, MouseEvent, ScrollBehavior, ScrollToOptions};
use yew::prelude::*;

use crate::feed::{FeedState, HoverState, ProjectRecord, SKELETON_CARD_COUNT};
use crate::sections::{nav_sections, SectionId, ViewportProbe, ViewportState, HEADER_OFFSET_PX};

const SOCIAL_LINKS: &[(&str, &str)] = &[
    ("LinkedIn", "https://www.linkedin.com/in/sherifrahim/"),
    ("GitHub", "https://github.com/sherifrahim"),
    ("Email", "mailto:contact@sherifrahim.com"),
];

/// Geometry reads backed by the real window and document.
struct DomProbe;

impl ViewportProbe for DomProbe {
    fn scroll_offset(&self) -> f64 {
        window().and_then(|win| win.scroll_y().ok()).unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        window()
            .and_then(|win| win.inner_height().ok())
            .and_then(|value| value.as_f64())
            .unwrap_or(720.0)
    }

    fn section_top(&self, id: SectionId) -> Option<f64> {
        let document = window()?.document()?;
        let element = document.get_element_by_id(id.as_str())?;
        Some(element.get_bounding_client_rect().top())
    }
}

fn scroll_to_section(id: SectionId) {
    let Some(win) = window() else {
        return;
    };
    let Some(document) = win.document() else {
        return;
    };
    // Absent target: navigation is a silent no-op.
    let Some(element) = document.get_element_by_id(id.as_str()) else {
        return;
    };

    let page_offset = win.page_y_offset().unwrap_or(0.0);
    let top = element.get_bounding_client_rect().top() + page_offset - HEADER_OFFSET_PX;

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&options);
}

#[derive(Default, PartialEq)]
struct Viewport(ViewportState);

enum ViewportAction {
    Scrolled,
    PointerMoved(i32, i32),
}

impl Reducible for Viewport {
    type Action = ViewportAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = match action {
            ViewportAction::Scrolled => self.0.on_scroll(&DomProbe),
            ViewportAction::PointerMoved(x, y) => self.0.on_pointer_move(x, y),
        };
        Rc::new(Self(next))
    }
}

async fn fetch_projects() -> Result<Vec<ProjectRecord>, String> {
    let response = Request::get("/api/projects")
        .send()
        .await
        .map_err(|error| error.to_string())?;

    if !response.ok() {
        return Err(format!(
            "project listing returned status {}",
            response.status()
        ));
    }

    response
        .json::<Vec<ProjectRecord>>()
        .await
        .map_err(|error| error.to_string())
}

#[derive(Properties, PartialEq)]
struct ProjectCardProps {
    record: ProjectRecord,
    hovered: bool,
    index: usize,
    on_hover_enter: Callback<usize>,
    on_hover_leave: Callback<usize>,
}

#[function_component(ProjectCard)]
fn project_card(props: &ProjectCardProps) -> Html {
    let onmouseenter = {
        let index = props.index;
        let on_hover_enter = props.on_hover_enter.clone();
        Callback::from(move |_: MouseEvent| on_hover_enter.emit(index))
    };

    let onmouseleave = {
        let index = props.index;
        let on_hover_leave = props.on_hover_leave.clone();
        Callback::from(move |_: MouseEvent| on_hover_leave.emit(index))
    };

    let record = &props.record;

    html! {
        <article
            class={classes!("project-card", props.hovered.then_some("is-hovered"))}
            onmouseenter={onmouseenter}
            onmouseleave={onmouseleave}
        >
            <img
                class="project-card-media"
                src={record.image_url.clone()}
                alt={record.title.clone()}
                loading="lazy"
            />
            <div class="project-card-body">
                <div class="project-card-heading">
                    <h3>{record.title.clone()}</h3>
                    {record.project_url.clone().map(|href| html! {
                        <a
                            class="project-card-link"
                            href={href}
                            target="_blank"
                            rel="noopener noreferrer"
                        >
                            <span aria-hidden="true">{"↗"}</span>
                            <span class="sr-only">{format!("Open {} (new tab)", record.title)}</span>
                        </a>
                    })}
                </div>
                <p class="project-card-description">{record.description.clone()}</p>
                <ul class="project-card-tags">
                    {for record.tags.iter().map(|tag| html! {
                        <li class="project-tag">{tag.clone()}</li>
                    })}
                </ul>
            </div>
        </article>
    }
}

#[function_component(ProjectFeed)]
fn project_feed() -> Html {
    let feed = use_state(|| FeedState::Loading);
    let hover = use_state(HoverState::default);
    let attempt = use_state(|| 0u32);

    {
        let feed = feed.clone();
        use_effect_with(*attempt, move |_| {
            feed.set(FeedState::Loading);

            // Cleanup flips this so a fetch resolving after unmount (or
            // after a retry superseded it) never applies state.
            let alive = Rc::new(Cell::new(true));
            let alive_for_fetch = alive.clone();
            spawn_local(async move {
                let settled = match fetch_projects().await {
                    Ok(records) => FeedState::Loaded(records),
                    Err(message) => FeedState::Failed(message),
                };
                if alive_for_fetch.get() {
                    feed.set(settled);
                }
            });

            move || alive.set(false)
        });
    }

    let on_hover_enter = {
        let hover = hover.clone();
        Callback::from(move |index: usize| hover.set((*hover).enter(index)))
    };

    let on_hover_leave = {
        let hover = hover.clone();
        Callback::from(move |index: usize| hover.set((*hover).leave(index)))
    };

    let on_retry = {
        let attempt = attempt.clone();
        Callback::from(move |_: MouseEvent| attempt.set(*attempt + 1))
    };

    let grid = match &*feed {
        FeedState::Loading => html! {
            <>
                {for (0..SKELETON_CARD_COUNT).map(|index| html! {
                    <div key={index} class="project-card project-card-skeleton" aria-hidden="true" />
                })}
            </>
        },
        FeedState::Failed(message) => html! {
            <div class="project-feed-error" role="alert">
                <p>{format!("Couldn't load projects: {message}")}</p>
                <button type="button" onclick={on_retry}>{"Retry"}</button>
            </div>
        },
        FeedState::Loaded(records) => html! {
            <>
                {for records.iter().enumerate().map(|(index, record)| html! {
                    <ProjectCard
                        key={record.id.clone()}
                        record={record.clone()}
                        hovered={hover.is_hovered(index)}
                        index={index}
                        on_hover_enter={on_hover_enter.clone()}
                        on_hover_leave={on_hover_leave.clone()}
                    />
                })}
            </>
        },
    };

    html! {
        <>
            <h2>{"Featured Projects"}</h2>
            <p class="section-subtitle">{"Building the future, one project at a time"}</p>
            <div class="project-grid">{grid}</div>
        </>
    }
}

#[function_component(App)]
fn app() -> Html {
    let viewport = use_reducer(Viewport::default);
    let menu_open = use_state(|| false);

    {
        let dispatcher = viewport.dispatcher();
        use_effect_with((), move |_| {
            let teardown: Box<dyn FnOnce()> = match window() {
                Some(win) => {
                    let scroll_dispatcher = dispatcher.clone();
                    let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                        scroll_dispatcher.dispatch(ViewportAction::Scrolled);
                    });

                    let move_dispatcher = dispatcher;
                    let on_mousemove =
                        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                            move_dispatcher.dispatch(ViewportAction::PointerMoved(
                                event.client_x(),
                                event.client_y(),
                            ));
                        });

                    let _ = win.add_event_listener_with_callback(
                        "scroll",
                        on_scroll.as_ref().unchecked_ref(),
                    );
                    let _ = win.add_event_listener_with_callback(
                        "mousemove",
                        on_mousemove.as_ref().unchecked_ref(),
                    );

                    Box::new(move || {
                        if let Some(win) = window() {
                            let _ = win.remove_event_listener_with_callback(
                                "scroll",
                                on_scroll.as_ref().unchecked_ref(),
                            );
                            let _ = win.remove_event_listener_with_callback(
                                "mousemove",
                                on_mousemove.as_ref().unchecked_ref(),
                            );
                        }
                        drop(on_scroll);
                        drop(on_mousemove);
                    })
                }
                None => Box::new(|| ()),
            };
            teardown
        });
    }

    let state = viewport.0;
    let (pointer_x, pointer_y) = state.pointer;
    let cursor_style = format!("--cursor-x: {pointer_x}px; --cursor-y: {pointer_y}px;");

    let navigate = {
        let menu_open = menu_open.clone();
        Callback::from(move |id: SectionId| {
            scroll_to_section(id);
            menu_open.set(false);
        })
    };

    let on_logo_click = {
        let navigate = navigate.clone();
        Callback::from(move |_: MouseEvent| navigate.emit(SectionId::Hero))
    };

    let on_menu_toggle = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    let nav_items = nav_sections()
        .map(|section| {
            let onclick = {
                let navigate = navigate.clone();
                let id = section.id;
                Callback::from(move |_: MouseEvent| navigate.emit(id))
            };
            let active = state.active_section == section.id;
            html! {
                <button
                    type="button"
                    class={classes!("nav-link", active.then_some("is-active"))}
                    aria-current={active.then_some("true")}
                    onclick={onclick}
                >
                    {section.label}
                </button>
            }
        })
        .collect::<Html>();

    let social_links = SOCIAL_LINKS
        .iter()
        .map(|(label, href)| {
            let external = !href.starts_with("mailto:");
            html! {
                <a
                    class="social-link"
                    href={*href}
                    target={external.then_some("_blank")}
                    rel="noopener noreferrer"
                >
                    {*label}
                </a>
            }
        })
        .collect::<Html>();

    let year = js_sys::Date::new_0().get_full_year();

    html! {
        <div class="page-shell" style={cursor_style}>
            <div class="custom-cursor" aria-hidden="true" />
            <header class={classes!("site-header", state.scrolled_past_threshold.then_some("is-scrolled"))}>
                <nav class="site-nav">
                    <button type="button" class="logo" onclick={on_logo_click}>{"SR"}</button>
                    <div class="nav-links">{nav_items}</div>
                    <div class="nav-social">{social_links.clone()}</div>
                    <button
                        type="button"
                        class="menu-toggle"
                        aria-expanded={menu_open.to_string()}
                        aria-label="Toggle navigation menu"
                        onclick={on_menu_toggle}
                    >
                        <span aria-hidden="true">{if *menu_open { "✕" } else { "☰" }}</span>
                    </button>
                </nav>
            </header>

            if *menu_open {
                <div class="mobile-menu">
                    {
                        nav_sections()
                            .map(|section| {
                                let onclick = {
                                    let navigate = navigate.clone();
                                    let id = section.id;
                                    Callback::from(move |_: MouseEvent| navigate.emit(id))
                                };
                                html! {
                                    <button type="button" class="mobile-nav-link" onclick={onclick}>
                                        {section.label}
                                    </button>
                                }
                            })
                            .collect::<Html>()
                    }
                </div>
            }

            <main>
                <section id={SectionId::Hero.as_str()} class="section-block hero">
                    <h1>{"Sherif Rahim"}</h1>
                    <p class="hero-subtitle">{"Engineer building fast, dependable software for the web."}</p>
                </section>

                <section id={SectionId::About.as_str()} class="section-block">
                    <h2>{"About"}</h2>
                    <p>
                        {"I design and ship production systems end to end, from data plumbing to the pixels people touch."}
                    </p>
                </section>

                <section id={SectionId::Experience.as_str()} class="section-block">
                    <h2>{"Experience"}</h2>
                    <ul class="row-list">
                        <li>
                            <span class="role">{"Senior Software Engineer"}</span>
                            <span class="muted">{" — platform and infrastructure work at scale."}</span>
                        </li>
                        <li>
                            <span class="role">{"Software Engineer"}</span>
                            <span class="muted">{" — full-stack product development."}</span>
                        </li>
                    </ul>
                </section>

                <section id={SectionId::Projects.as_str()} class="section-block">
                    <ProjectFeed />
                </section>

                <section id={SectionId::Contact.as_str()} class="section-block">
                    <h2>{"Contact"}</h2>
                    <p>{"Always open to interesting problems and good conversations."}</p>
                    <div class="contact-links">{social_links}</div>
                </section>
            </main>

            <footer class="site-footer">
                <p>{format!("© {year} Sherif Rahim. Crafted with passion and innovation.")}</p>
            </footer>
        </div>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
