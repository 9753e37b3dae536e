#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reward {
    Exp { amount: i64 },
    Gold { amount: i64 },
}

fn roll_amount(rng: &mut Xoshiro256PlusPlus, range: RewardRange) -> i64 {
    if range.max <= range.min {
        return range.min;
    }
    rng.gen_range(range.min..=range.max)
}

fn roll_rewards(
    rng: &mut Xoshiro256PlusPlus,
    exp: Option<RewardRange>,
    gold: Option<RewardRange>,
) -> Vec<Reward> {
    let mut rewards = Vec::new();
    if let Some(range) = exp {
        rewards.push(Reward::Exp {
            amount: roll_amount(rng, range),
        });
    }
    if let Some(range) = gold {
        rewards.push(Reward::Gold {
            amount: roll_amount(rng, range),
        });
    }
    rewards
}
