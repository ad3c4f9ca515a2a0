//! Side spray patterns
//!
//! Every side opens the same way: tool angle, pot on, rise to the side's
//! travel height, turn the fixture, go to the pattern start and drop to the
//! spray height. It closes by rising again and parking at (1, 1, 0).
//!
//! ```text
//! Side 1   one X sweep, position gated
//! Side 2   5 gang-Y sweeps, X shifts -, closing X pass +23 in
//! Side 3   5 X sweeps alternating -, +, -, +, -, Y steps -
//! Side 4   5 gang-Y sweeps, X shifts +, closing X pass -23 in
//! ```

use sprayline_protocol::SideId;

use crate::config::machine::{
    CLOSING_PASS_IN, CLOSING_PASS_Z_IN, CLOSING_TOOL_ANGLE, DEFAULT_ROT_SPEED, DEFAULT_X_SPEED,
    DEFAULT_Y_SPEED, DEFAULT_Z_SPEED, PRE_HOME_X_IN, PRE_HOME_Y_IN, SIDE1_LEAD_OUT_IN,
    SLOW_SWEEP_FACTOR, SWEEP_COUNT, SWEEP_LEAD_IN_IN, SWEEP_LEAD_OUT_IN,
};
use crate::config::{Settings, SideSettings};
use crate::motion::{
    degrees_to_steps, inches_to_steps, scaled_speed, Gate, GateMode, MoveTo, Sequence,
    SequenceFull, Step, Sweep, SweepAxis,
};

/// Direction the sweeps of a side progress in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Minus,
    Plus,
}

impl Shift {
    fn apply(self, from: i32, by: i32) -> i32 {
        match self {
            Shift::Minus => from - by,
            Shift::Plus => from + by,
        }
    }
}

/// Script under construction plus where the carriage will be
struct Pattern {
    seq: Sequence,
    x: i32,
    y: i32,
    side_z: i32,
}

impl Pattern {
    fn open(p: &SideSettings) -> Result<Self, SequenceFull> {
        let x = inches_to_steps(p.start_x);
        let y = inches_to_steps(p.start_y);
        let side_z = inches_to_steps(p.side_z_height);

        let mut seq = Sequence::new();
        seq.push(Step::ToolAngle(p.tool_angle))?;
        seq.push(Step::Pressurizer(true))?;
        seq.push(Step::Move(MoveTo::new().z(side_z, DEFAULT_Z_SPEED)))?;
        seq.push(Step::Move(
            MoveTo::new().rotation(degrees_to_steps(p.rotation_angle), DEFAULT_ROT_SPEED),
        ))?;
        seq.push(Step::Move(travel(x, y)))?;
        seq.push(Step::Move(
            MoveTo::new().z(inches_to_steps(p.z_height), DEFAULT_Z_SPEED),
        ))?;

        Ok(Self { seq, x, y, side_z })
    }

    fn travel_to(&mut self, x: i32, y: i32) -> Result<(), SequenceFull> {
        self.x = x;
        self.y = y;
        self.seq.push(Step::Move(travel(x, y)))
    }

    fn sweep(
        &mut self,
        axis: SweepAxis,
        target: i32,
        speed_hz: u32,
        gate: Gate,
    ) -> Result<(), SequenceFull> {
        match axis {
            SweepAxis::X => self.x = target,
            SweepAxis::Y => self.y = target,
        }
        self.seq.push(Step::Sweep(Sweep {
            axis,
            target,
            speed_hz,
            gate,
        }))
    }

    fn close(mut self) -> Result<Sequence, SequenceFull> {
        self.seq.push(Step::Move(MoveTo::new().z(self.side_z, DEFAULT_Z_SPEED)))?;
        self.seq.push(Step::Move(
            travel(inches_to_steps(PRE_HOME_X_IN), inches_to_steps(PRE_HOME_Y_IN))
                .z(0, DEFAULT_Z_SPEED),
        ))?;
        Ok(self.seq)
    }
}

fn travel(x: i32, y: i32) -> MoveTo {
    MoveTo::new().x(x, DEFAULT_X_SPEED).y(y, DEFAULT_Y_SPEED)
}

fn gate(lead_out_in: f32, mode: GateMode) -> Gate {
    Gate {
        lead_in: inches_to_steps(SWEEP_LEAD_IN_IN).unsigned_abs(),
        lead_out: inches_to_steps(lead_out_in).unsigned_abs(),
        mode,
    }
}

/// Build the full script for one side
pub fn side_pattern(side: SideId, settings: &Settings) -> Result<Sequence, SequenceFull> {
    let p = settings.side(side);
    let pattern = Pattern::open(p)?;
    match side {
        SideId::One => side_one(pattern, p),
        SideId::Two => gang_sweeps(pattern, p, Shift::Minus),
        SideId::Three => side_three(pattern, p),
        SideId::Four => gang_sweeps(pattern, p, Shift::Plus),
    }
}

fn side_one(mut pattern: Pattern, p: &SideSettings) -> Result<Sequence, SequenceFull> {
    let target = pattern.x + inches_to_steps(p.shift_x);
    pattern.sweep(
        SweepAxis::X,
        target,
        p.paint_x_speed,
        gate(SIDE1_LEAD_OUT_IN, GateMode::Position),
    )?;
    pattern.close()
}

/// Sides 2 and 4: Y sweeps from the top, X shifted between them, then a
/// closing X pass along the long edge
fn gang_sweeps(
    mut pattern: Pattern,
    p: &SideSettings,
    shift: Shift,
) -> Result<Sequence, SequenceFull> {
    let top = pattern.y;
    let bottom = top - inches_to_steps(p.sweep_y);
    let pitch = inches_to_steps(p.shift_x);

    for i in 0..SWEEP_COUNT {
        let x = if i == 0 {
            pattern.x
        } else {
            shift.apply(pattern.x, pitch)
        };
        pattern.travel_to(x, top)?;

        let speed = if i == 0 {
            scaled_speed(p.paint_y_speed, SLOW_SWEEP_FACTOR)
        } else {
            p.paint_y_speed
        };
        pattern.sweep(SweepAxis::Y, bottom, speed, gate(SWEEP_LEAD_OUT_IN, GateMode::Time))?;
    }

    // Closing pass runs back across the shifts
    let (step_off_in, pass) = match shift {
        Shift::Minus => (-2.0, Shift::Plus),
        Shift::Plus => (1.0, Shift::Minus),
    };
    let (x, y) = (pattern.x + inches_to_steps(step_off_in), pattern.y);
    pattern.travel_to(x, y)?;
    pattern.seq.push(Step::ToolAngle(CLOSING_TOOL_ANGLE))?;
    pattern.seq.push(Step::Move(
        MoveTo::new().z(inches_to_steps(CLOSING_PASS_Z_IN), DEFAULT_Z_SPEED),
    ))?;

    let end = pass.apply(pattern.x, inches_to_steps(CLOSING_PASS_IN));
    pattern.sweep(
        SweepAxis::X,
        end,
        p.paint_x_speed,
        gate(SWEEP_LEAD_OUT_IN, GateMode::Position),
    )?;
    pattern.close()
}

/// Side 3: X sweeps alternating direction, stepping down in Y
fn side_three(mut pattern: Pattern, p: &SideSettings) -> Result<Sequence, SequenceFull> {
    let length = inches_to_steps(p.shift_x);
    let pitch = inches_to_steps(p.sweep_y);

    for i in 0..SWEEP_COUNT {
        if i > 0 {
            let (x, y) = (pattern.x, pattern.y - pitch);
            pattern.travel_to(x, y)?;
        }
        let dir = if i % 2 == 0 { Shift::Minus } else { Shift::Plus };
        let speed = if i == SWEEP_COUNT - 1 {
            scaled_speed(p.paint_x_speed, SLOW_SWEEP_FACTOR)
        } else {
            p.paint_x_speed
        };
        let target = dir.apply(pattern.x, length);
        pattern.sweep(SweepAxis::X, target, speed, gate(SWEEP_LEAD_OUT_IN, GateMode::Time))?;
    }
    pattern.close()
}
