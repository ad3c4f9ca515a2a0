//! Pneumatic and servo outputs

/// On/off outputs of the spray and pick heads, plus the tool servo
pub trait ActuatorIo {
    /// Open or close the spray gun solenoid
    fn set_spray_valve(&mut self, on: bool);

    /// Pressurize the paint pot
    fn set_pressurizer(&mut self, on: bool);

    /// Suction on the pick head
    fn set_vacuum(&mut self, on: bool);

    /// Extend (true) or retract (false) the pick cylinder
    fn set_pick_cylinder(&mut self, extended: bool);

    /// Tool servo angle in degrees (0-180)
    fn set_tool_angle(&mut self, degrees: f32);

    fn spray_valve(&self) -> bool;

    fn pressurizer(&self) -> bool;

    fn vacuum(&self) -> bool;

    fn pick_cylinder(&self) -> bool;

    /// De-energize everything that can spray or grip
    fn all_off(&mut self) {
        self.set_spray_valve(false);
        self.set_pressurizer(false);
        self.set_vacuum(false);
        self.set_pick_cylinder(false);
    }
}
