use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

const CONFETTI_SYMBOLS: [char; 7] = ['*', '+', 'o', '.', '~', '^', '#'];

const BANNERS: [&str; 5] = [
    "SAVED!",
    "ESCAPED THE GALLOWS!",
    "WELL GUESSED!",
    "FREE!",
    "NOT TODAY!",
];

/// Confetti particle for the win animation
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    age: f64,
    max_age: f64,
}

impl Particle {
    fn new<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
        }
    }

    /// Remaining life fraction, 1.0 fresh down to 0.0 expired; drives the fade
    pub fn fade(&self) -> f64 {
        (1.0 - self.age / self.max_age).max(0.0)
    }

    /// Advance by `dt` seconds; false once the particle has expired
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 15.0 * dt; // gravity
        self.age += dt;
        self.age < self.max_age
    }
}

/// Short confetti burst shown when the word is fully revealed
#[derive(Debug)]
pub struct WinAnimation {
    pub particles: Vec<Particle>,
    pub banner: &'static str,
    pub is_active: bool,
    start_time: SystemTime,
    duration: f64,
    terminal_width: f64,
    terminal_height: f64,
}

impl WinAnimation {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            banner: BANNERS[0],
            is_active: false,
            start_time: SystemTime::now(),
            duration: 3.0,
            terminal_width: 80.0,
            terminal_height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.start_time = SystemTime::now();
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;
        self.banner = *BANNERS.choose(&mut rng).unwrap_or(&BANNERS[0]);

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;

        for _ in 0..30 {
            let offset_x = rng.gen_range(-15.0..15.0);
            let offset_y = rng.gen_range(-8.0..8.0);
            self.particles
                .push(Particle::new(center_x + offset_x, center_y + offset_y, &mut rng));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let elapsed = self.start_time.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.duration {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let dt = 0.1; // fixed timestep per tick
        let width = self.terminal_width;
        let height = self.terminal_height;
        self.particles.retain_mut(|particle| {
            let alive = particle.update(dt);
            let buffer = 5.0;
            let off_screen = particle.y > height + buffer
                || particle.x < -buffer
                || particle.x > width + buffer;
            alive && !off_screen
        });
    }
}

impl Default for WinAnimation {
    fn default() -> Self {
        Self::new()
    }
}
