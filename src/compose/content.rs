// src/compose/content.rs
//
// Fixed homepage copy. Edited here, not in the database.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hero {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta_label: &'static str,
    pub cta_link: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselSlide {
    pub image: &'static str,
    pub caption: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct About {
    pub heading: &'static str,
    pub body: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Testimonial {
    pub name: &'static str,
    pub quote: &'static str,
    pub rating: u8,
}

pub fn hero() -> Hero {
    Hero {
        title: "Train Hard. Stay Humble.",
        subtitle: "Boxing, Muay Thai and Brazilian Jiu-Jitsu for every level.",
        cta_label: "See the timetable",
        cta_link: "/classes",
        image: "/images/hero.jpg",
    }
}

pub fn carousel() -> Vec<CarouselSlide> {
    vec![
        CarouselSlide { image: "/images/carousel/mats.jpg", caption: "Open mat every Saturday" },
        CarouselSlide { image: "/images/carousel/pads.jpg", caption: "Pad work with our coaches" },
        CarouselSlide { image: "/images/carousel/kids.jpg", caption: "Kids classes after school" },
    ]
}

pub fn about() -> About {
    About {
        heading: "About the gym",
        body: "A family-run studio where beginners and fighters share the same mats. \
               Small classes, experienced coaches, no egos.",
        image: "/images/about.jpg",
    }
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            name: "Sam",
            quote: "I walked in never having thrown a punch. Six months later I love it.",
            rating: 5,
        },
        Testimonial {
            name: "Priya",
            quote: "Friendly coaches and a timetable that fits around work.",
            rating: 5,
        },
        Testimonial {
            name: "Marco",
            quote: "The BJJ fundamentals course is the best I've done.",
            rating: 4,
        },
    ]
}
