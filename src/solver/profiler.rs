pub trait Profiler {
    fn new() -> Self;
    fn start_iteration(&mut self, bound: u32);
    fn visit_node(&mut self, depth: u32);
}

pub struct NoProfile;

impl Profiler for NoProfile {
    fn new() -> NoProfile {
        NoProfile
    }

    fn start_iteration(&mut self, _bound: u32) {}

    fn visit_node(&mut self, _depth: u32) {}
}

pub struct Profile {
    pub max_depth: u32,
    pub node_count: u64,
    /// The bound of every iteration, in the order they ran.
    pub bounds: Vec<u32>,
}

impl Profile {
    pub fn print(&self) -> String {
        let bounds: Vec<String> = self.bounds.iter().map(u32::to_string).collect();

        format!(
            "Max Depth: {}\nNode Count: {}\nBounds: {}\n",
            self.max_depth,
            self.node_count,
            bounds.join(", ")
        )
    }
}

impl Profiler for Profile {
    fn new() -> Profile {
        Profile {
            max_depth: 0,
            node_count: 0,
            bounds: Vec::new(),
        }
    }

    fn start_iteration(&mut self, bound: u32) {
        self.bounds.push(bound);
    }

    fn visit_node(&mut self, depth: u32) {
        self.node_count += 1;
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }
}
