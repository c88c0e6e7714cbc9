//! Static narrative text shown by the dashboard views.

/// Body of the introduction view.
pub const INTRODUCTION: &str = "\
The global oil market is volatile and strategically important: its price is \
moved by many factors that ripple through economies and supply chains around \
the world. Understanding the dynamics behind Brent price swings matters to \
energy companies, investors, and policy makers who try to anticipate trends \
and manage risk in a constantly changing environment.

This dashboard explores how geopolitical events, global economic shocks, \
energy demand patterns and technological change relate to the price of a \
barrel of Brent crude. Historical prices are annotated with the event window \
they fall in, and an additive time-series model uses those events as \
regressors to project the price forward.";

/// Navigation hint under the introduction.
pub const NAVIGATION_HINT: &str =
    "Use the side menu to move on to the exploratory analysis and the Brent price forecast.";

/// Opening paragraph of the insights section.
pub const INSIGHTS_PREAMBLE: &str = "\
Oil prices have alternated between long stable stretches and turbulent \
periods. Geopolitical events and economic crises (the September 11 attacks, \
the 2003 Iraq invasion, unrest in the Middle East) pushed prices up slowly but \
steadily, while in 2020 the Russia/Saudi Arabia price war and the COVID-19 \
slowdown reshaped the market.";

/// Explanation shown at the top of the forecasting view.
pub const FORECASTING_HELP: &str = "\
Pick a start and end date to recalibrate the model on that window only, then \
choose how many days ahead to forecast. Short windows emphasise recent \
dynamics; long windows capture slower trends.";

/// Footer shown under the insights.
pub const FOOTER: &str = "Interactive MVP forecasting Brent crude prices with event regressors.";

struct Insight {
    /// Lowercase fragments, any of which identifies the event in a label.
    keys: &'static [&'static str],
    title: &'static str,
    text: &'static str,
}

const INSIGHTS: &[Insight] = &[
    Insight {
        keys: &["gulf", "golfo", "kuwait"],
        title: "Gulf War (1990)",
        text: "On 2 August 1990 Iraqi forces invaded and annexed Kuwait; seven months later \
               a US-led coalition drove them out. The supply scare sent prices sharply higher.",
    },
    Insight {
        keys: &["september", "9/11", "setembro", "11/09"],
        title: "September 11 attacks (2001)",
        text: "The prospect of a war between the United States and the Middle East pushed prices \
               up; the US-led offensive in Afghanistan began less than a month after the attacks.",
    },
    Insight {
        keys: &["iraq", "iraque"],
        title: "Iraq invasion (2003)",
        text: "The invasion opened in March 2003 with a combined US, UK, Australian and Polish \
               force and lasted just over a month of major combat operations.",
    },
    Insight {
        keys: &["2008", "financial", "lehman", "financeira"],
        title: "Financial crisis (2008)",
        text: "The US mortgage crisis caused days of market panic; on the day Lehman Brothers \
               failed Wall Street had its worst losses since 2001.",
    },
    Insight {
        keys: &["shale", "xisto"],
        title: "Shale oil",
        text: "New extraction technology made the United States the largest producer in the \
               world, raising global supply and weighing on prices.",
    },
    Insight {
        keys: &["arab", "árabe", "arabe"],
        title: "Arab Spring (2010-2013)",
        text: "A wave of protests across North Africa and the Middle East, spread quickly by \
               social media, unsettled several producing countries.",
    },
    Insight {
        keys: &["paris"],
        title: "Paris Agreement (2015)",
        text: "Adopted at COP21 by 195 countries committed to cutting greenhouse gas emissions, \
               strengthening the global response to climate change.",
    },
    Insight {
        keys: &["iran", "irã"],
        title: "Sanctions on Iran",
        text: "The United States reimposed economic sanctions on Iran, arguing the regime did not \
               honour the 2015 nuclear agreement.",
    },
    Insight {
        keys: &["covid", "pandemic", "pandemia"],
        title: "COVID-19 (2020)",
        text: "Collapsing activity and mobility restrictions cut demand; Brent traded at its \
               lowest level since 2004.",
    },
    Insight {
        keys: &["opec", "opep"],
        title: "OPEC+ production cut (2022)",
        text: "OPEC+ agreed a 2 million barrel per day cut from November 2022, the largest since \
               April 2020, and extended its cooperation agreement through 2023.",
    },
    Insight {
        keys: &["red sea", "mar vermelho", "houthi"],
        title: "Red Sea attacks (2023)",
        text: "Houthi drone attacks on merchant ships led oil companies to reroute tankers; Brent \
               rose 1.8% to $77.95 on the day.",
    },
];

/// Title and narrative for an event label, if it names a known historical event.
pub fn event_insight(label: &str) -> Option<(&'static str, &'static str)> {
    let label = label.to_lowercase();
    INSIGHTS
        .iter()
        .find(|i| i.keys.iter().any(|k| label.contains(k)))
        .map(|i| (i.title, i.text))
}
