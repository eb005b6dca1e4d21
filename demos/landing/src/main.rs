//! Plays the landing page in the terminal: loading screen, hero typewriters,
//! then a scripted scroll through every section.
//!
//! ```text
//! cargo run -p landing -- [--config landing.json] [--fast]
//! ```

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use unveil_core::*;
use unveil_ui::*;
use web_time::Duration;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SkillLevel {
    name: String,
    level: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct ScrollStop {
    at_ms: f64,
    section: String,
}

impl Default for ScrollStop {
    fn default() -> Self {
        Self {
            at_ms: 0.0,
            section: "hero".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct LandingConfig {
    viewport_height: f32,
    loading: LoadingConfig,
    greeting: TypewriterConfig,
    name: TypewriterConfig,
    roles: TypewriterConfig,
    visibility: VisibilityConfig,
    highlights: StaggerConfig,
    projects: StaggerConfig,
    skill_categories: StaggerConfig,
    top_skills: Vec<SkillLevel>,
    counter_duration_ms: f64,
    scroll_script: Vec<ScrollStop>,
    run_for_ms: f64,
}

impl Default for LandingConfig {
    fn default() -> Self {
        let skill = |name: &str, level| SkillLevel {
            name: name.to_string(),
            level,
        };
        let stop = |at_ms, section: &str| ScrollStop {
            at_ms,
            section: section.to_string(),
        };
        Self {
            viewport_height: 800.0,
            loading: LoadingConfig::default(),
            greeting: TypewriterConfig {
                typing_speed: 100.0,
                pause_duration: 1000.0,
                initial_delay: 500.0,
                show_cursor: false,
                looping: false,
                ..TypewriterConfig::new(["Salut, Je suis"])
            },
            name: TypewriterConfig {
                typing_speed: 120.0,
                pause_duration: 1500.0,
                initial_delay: 1800.0,
                show_cursor: false,
                looping: false,
                ..TypewriterConfig::new(["Ayman El Badri"])
            },
            roles: TypewriterConfig {
                typing_speed: 75.0,
                deleting_speed: Some(50.0),
                pause_duration: 2000.0,
                initial_delay: 3500.0,
                ..TypewriterConfig::new([
                    "Développeur Full Stack",
                    "Créateur d'Expériences Web",
                    "Passionné de Technologie",
                    "Développeur Frontend",
                    "Développeur Backend",
                ])
            },
            visibility: VisibilityConfig::default(),
            highlights: StaggerConfig {
                base_delay: 0.5,
                increment: 0.1,
                duration: None,
            },
            projects: StaggerConfig::default(),
            skill_categories: StaggerConfig::default(),
            top_skills: vec![
                skill("HTML5", 90),
                skill("JavaScript", 80),
                skill("C#", 75),
                skill("React", 70),
            ],
            counter_duration_ms: 1500.0,
            scroll_script: vec![
                stop(9000.0, "about"),
                stop(11000.0, "projects"),
                stop(13000.0, "skills"),
                stop(16000.0, "contact"),
            ],
            run_for_ms: 18000.0,
        }
    }
}

struct Args {
    config: Option<PathBuf>,
    fast: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        fast: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let path = it.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--fast" => args.fast = true,
            other => anyhow::bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<LandingConfig> {
    let Some(path) = path else {
        return Ok(LandingConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .map_err(ConfigError::from)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Moves simulated time forward one frame, sleeping for it unless `fast`.
fn frame(sched: &ManualScheduler, fast: bool) -> Duration {
    let step = sched.frame_interval();
    if !fast {
        std::thread::sleep(step);
    }
    sched.advance(step);
    step
}

struct Page {
    greeting: Typewriter,
    name: Typewriter,
    roles: Typewriter,
    hero: StaggeredReveal,
    highlights: StaggeredReveal,
    projects: StaggeredReveal,
    categories: StaggeredReveal,
    counters: Vec<(String, NumericCounter)>,
    counters_gate: VisibilityTrigger,
    nav: NavigationMenu,
}

impl Page {
    fn mount(config: &LandingConfig, viewport: &Viewport, sched: Rc<ManualScheduler>) -> Self {
        let hero = viewport.add_region(0.0, 900.0);
        let about = viewport.add_region(900.0, 1100.0);
        let projects = viewport.add_region(2000.0, 1400.0);
        let skills = viewport.add_region(3400.0, 1300.0);
        let contact = viewport.add_region(4700.0, 800.0);

        let nav = NavigationMenu::new(
            viewport,
            vec![
                (NavItem::new("hero", "Accueil"), hero),
                (NavItem::new("about", "À propos"), about),
                (NavItem::new("projects", "Projets"), projects),
                (NavItem::new("skills", "Compétences"), skills),
                (NavItem::new("contact", "Contact"), contact),
            ],
        );

        let greeting = Typewriter::mount(
            config.greeting.clone(),
            sched.clone(),
            TypewriterCallbacks::default(),
        );
        let name = Typewriter::mount(
            config.name.clone(),
            sched.clone(),
            TypewriterCallbacks::default().on_complete(|| log::info!("hero: name typed")),
        );
        let roles = Typewriter::mount(
            config.roles.clone(),
            sched.clone(),
            TypewriterCallbacks::default()
                .on_sentence_complete(|phrase, i| log::info!("hero: role {i} done ({phrase})")),
        );

        let hero_timeline = AnimationTimeline::from_pairs(&[(0.5, 2.5), (1.2, 1.5), (2.0, 1.0)]);
        let hero_reveal = StaggeredReveal::new(hero_timeline, sched.clone());
        hero_reveal.start();

        let staggered = |region, stagger: &StaggerConfig, count| {
            let reveal = StaggeredReveal::new(stagger.timeline(count), sched.clone());
            let trigger = VisibilityTrigger::observe(viewport, region, config.visibility, || {});
            reveal.start_on(&trigger);
            reveal
        };
        let highlights = staggered(about, &config.highlights, 4);
        let projects = staggered(projects, &config.projects, 3);
        let categories = staggered(skills, &config.skill_categories, 4);

        let counters: Vec<(String, NumericCounter)> = config
            .top_skills
            .iter()
            .map(|s| {
                let counter = NumericCounter::new(
                    CounterConfig::new(s.level, config.counter_duration_ms),
                    sched.clone(),
                );
                (s.name.clone(), counter)
            })
            .collect();
        let gated: Vec<NumericCounter> = counters.iter().map(|(_, c)| c.clone()).collect();
        let counters_gate = VisibilityTrigger::observe(viewport, skills, config.visibility, move || {
            for c in &gated {
                c.set_active(true);
            }
        });

        Self {
            greeting,
            name,
            roles,
            hero: hero_reveal,
            highlights,
            projects,
            categories,
            counters,
            counters_gate,
            nav,
        }
    }

    fn render(&self) -> String {
        let skills: Vec<String> = if self.counters_gate.is_revealed() {
            self.counters
                .iter()
                .map(|(name, c)| format!("{name} {}%", c.current()))
                .collect()
        } else {
            vec!["counters waiting".to_string()]
        };
        format!(
            "[{}] {} {} · {} | hero {}/3 about {}/4 projects {}/3 skills {}/4 | {}",
            self.nav.active_id().unwrap_or_default(),
            self.greeting.display(),
            self.name.display(),
            self.roles.display(),
            self.hero.revealed_count(),
            self.highlights.revealed_count(),
            self.projects.revealed_count(),
            self.categories.revealed_count(),
            skills.join(", "),
        )
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;

    let sched = ManualScheduler::new();
    let scope = Scope::new();

    let loading = scope.run(|| {
        LoadingSequence::start(config.loading.clone(), sched.clone(), || {
            log::info!("loading screen dismissed")
        })
    });
    let mut last = String::new();
    while !loading.is_complete() {
        if sched.pending() == 0 {
            anyhow::bail!("loading sequence stalled");
        }
        frame(&sched, args.fast);
        let line = format!("{:>3}% {}", loading.progress(), loading.label());
        if line != last {
            println!("{line}");
            last = line;
        }
    }

    let viewport = Viewport::new(config.viewport_height);
    let page = scope.run(|| Page::mount(&config, &viewport, sched.clone()));

    let mut script = config.scroll_script.clone();
    script.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut script = script.into_iter().peekable();
    let mut elapsed = Duration::ZERO;
    let run_for = millis(config.run_for_ms);
    while elapsed < run_for {
        elapsed += frame(&sched, args.fast);
        while let Some(stop) = script.next_if(|s| millis(s.at_ms) <= elapsed) {
            page.nav.toggle_menu();
            if !page.nav.select(&stop.section) {
                log::warn!("scroll script: unknown section {:?}", stop.section);
                page.nav.close_menu();
            }
        }
        let line = page.render();
        if line != last {
            println!("{:>6.2}s {line}", elapsed.as_secs_f64());
            last = line;
        }
    }

    scope.dispose();
    log::info!("disposed; {} timers left", sched.pending());
    Ok(())
}
